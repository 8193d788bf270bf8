//! Rich-Layout: incremental layout of append-only rich text
//!
//! This crate provides:
//! - An append-only document of styled text runs and embedded objects
//! - Paragraph analysis (itemization, shaping, break attributes) behind a
//!   pluggable [`TextShaper`]
//! - Word wrapping with tab expansion and hanging whitespace
//! - Bidi-aware visual ordering, hit-testing and caret positions
//! - Incremental relayout driven by invalidation watermarks, so appending
//!   to a long log only lays out the tail
//! - A display list for painting and a flat line buffer for WASM hosts

pub mod document;
pub mod error;
pub mod layout;
pub mod render;
pub mod wasm;

pub use wasm::WasmTextView;

pub use document::{
    Document, DocumentChange, DocumentConfig, EmbeddedObject, EmbeddedObjectClient,
    EmbeddedObjectMeasurements, EmbeddedObjectSite, ObjectRef, Style,
};
pub use error::{LayoutError, Result};
pub use layout::{
    CaretPosition, Layout, LayoutConfig, LayoutSignal, SimpleShaper, SnapKind, SnapPosition,
    TextShaper,
};
pub use render::{DisplayItem, DisplayList, LayoutDiff, PaintOptions, Selection};

/// Point in layout or host coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Space around an embedded object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Padding {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Padding {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// Half-open rectangle: `x..x + width` by `y..y + height`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn offset(&self, by: Point) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// A document together with its layout, keeping the two in step: every
/// append is forwarded to the layout as an invalidation.
pub struct TextView {
    pub document: Document,
    pub layout: Layout,
}

impl TextView {
    pub fn new(shaper: Box<dyn TextShaper>) -> Self {
        Self {
            document: Document::new(),
            layout: Layout::new(shaper),
        }
    }

    pub fn with_config(
        document_config: DocumentConfig,
        layout_config: LayoutConfig,
        shaper: Box<dyn TextShaper>,
    ) -> Result<Self> {
        Ok(Self {
            document: Document::with_config(document_config)?,
            layout: Layout::with_config(layout_config, shaper)?,
        })
    }

    /// View over `text` in the default style, laid out with the default
    /// shaper
    pub fn with_text(text: &str) -> Self {
        let mut view = Self::new(Box::<SimpleShaper>::default());
        view.document = Document::from_text(text);
        view.layout.invalidate_paragraph_itemization(0);
        view
    }

    fn apply(&mut self, change: Option<DocumentChange>) {
        if let Some(change) = change {
            self.layout.invalidate(&change);
        }
    }

    pub fn append_text(&mut self, style: &Style, text: &str) -> Result<()> {
        let change = self.document.append_text(style, text)?;
        self.apply(change);
        Ok(())
    }

    /// Append in the style on top of the document's style stack
    pub fn append_text_current(&mut self, text: &str) {
        let change = self.document.append_text_current(text);
        self.apply(change);
    }

    pub fn append_line(&mut self, style: &Style) -> Result<()> {
        let change = self.document.append_line(style)?;
        self.apply(Some(change));
        Ok(())
    }

    pub fn append_object(&mut self, style: &Style, object: ObjectRef) -> Result<()> {
        let change = self.document.append_object(style, object)?;
        self.apply(Some(change));
        Ok(())
    }

    pub fn clear(&mut self) {
        let change = self.document.clear();
        self.apply(Some(change));
    }

    pub fn set_layout_width(&mut self, width: i32) -> Result<()> {
        self.layout.set_desired_layout_width(width)
    }

    pub fn set_right_to_left(&mut self, right_to_left: bool) {
        self.layout.set_desired_right_to_left(right_to_left);
    }

    /// Run a layout pass if anything is pending
    pub fn update(&mut self) -> LayoutDiff {
        self.layout.update(&self.document)
    }

    pub fn is_update_required(&self) -> bool {
        self.layout.is_update_required()
    }

    /// Character under `point`, with the layout drawn at `origin`
    pub fn snap_to_char(&mut self, point: Point, origin: Point) -> SnapPosition {
        self.layout.snap_to_char(&self.document, point, origin)
    }

    pub fn char_position(&mut self, char_index: usize) -> Option<CaretPosition> {
        self.layout.char_position(&self.document, char_index)
    }

    /// Paint commands for the part of the layout drawn at `origin` that
    /// falls inside `clip`
    pub fn display_list(
        &mut self,
        origin: Point,
        clip: Rect,
        selection: Option<Selection>,
        options: &PaintOptions,
    ) -> DisplayList {
        DisplayList::build(&self.document, &mut self.layout, origin, clip, selection, options)
    }

    /// Document text
    pub fn text(&self) -> String {
        self.document.to_string()
    }
}
