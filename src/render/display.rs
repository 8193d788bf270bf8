//! Display list: paint commands for the visible part of a layout

use crate::document::{Color, Document, FontDescriptor, RunKind};
use crate::layout::shaper::{GlyphId, GlyphOffset};
use crate::layout::{object_box, Layout, RunSlice, ScriptLine, ScriptParagraph, VisualRun};
use crate::{Point, Rect};

/// Identifies the line and script run a display item was painted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayItemId {
    pub paragraph_index: u32,
    pub line_index: u32,
    pub run_index: u32,
}

/// A range of characters to highlight. The length may be negative when the
/// selection was made backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub start: usize,
    pub length: isize,
}

impl Selection {
    pub fn new(start: usize, length: isize) -> Self {
        Self { start, length }
    }

    /// Normalized `start..end` character range
    pub fn ordered(&self) -> (usize, usize) {
        let other = if self.length < 0 {
            self.start.saturating_sub(self.length.unsigned_abs())
        } else {
            self.start.saturating_add(self.length as usize)
        };
        (self.start.min(other), self.start.max(other))
    }

    pub fn is_collapsed(&self) -> bool {
        self.length == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintOptions {
    pub selected_text_color: Color,
    pub selected_background_color: Color,
}

impl Default for PaintOptions {
    fn default() -> Self {
        Self {
            selected_text_color: Color::WHITE,
            selected_background_color: Color::HIGHLIGHT,
        }
    }
}

/// A paint command in host coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    /// Glyphs drawn left to right from `baseline`
    GlyphRun {
        id: DisplayItemId,
        baseline: Point,
        font: FontDescriptor,
        color: Color,
        glyphs: Vec<GlyphId>,
        advances: Vec<i32>,
        offsets: Vec<GlyphOffset>,
        /// First character painted, in document coordinates
        char_index: usize,
    },
    /// Box reserved for an embedded object; its client paints itself
    Object {
        id: DisplayItemId,
        char_index: usize,
        bounds: Rect,
    },
    /// Selection background, painted before the glyphs it covers
    Selection { rect: Rect, color: Color },
}

impl DisplayItem {
    pub fn id(&self) -> Option<DisplayItemId> {
        match self {
            DisplayItem::GlyphRun { id, .. } | DisplayItem::Object { id, .. } => Some(*id),
            DisplayItem::Selection { .. } => None,
        }
    }

    pub fn is_selection(&self) -> bool {
        matches!(self, DisplayItem::Selection { .. })
    }
}

/// Paint commands in painting order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    pub version: u64,
    pub items: Vec<DisplayItem>,
}

/// Per-pass painting parameters
struct Painter<'a> {
    document: &'a Document,
    origin: Point,
    layout_width: i32,
    right_to_left: bool,
    selection: Option<(usize, usize)>,
    options: &'a PaintOptions,
    items: Vec<DisplayItem>,
}

impl DisplayList {
    /// Paint the lines of `layout` drawn at `origin` that intersect `clip`
    pub fn build(
        document: &Document,
        layout: &mut Layout,
        origin: Point,
        clip: Rect,
        selection: Option<Selection>,
        options: &PaintOptions,
    ) -> Self {
        let mut painter = Painter {
            document,
            origin,
            layout_width: layout.current_layout_width(),
            right_to_left: layout.current_right_to_left(),
            selection: selection
                .filter(|selection| !selection.is_collapsed())
                .map(|selection| selection.ordered()),
            options,
            items: Vec::new(),
        };

        let top = clip.y - origin.y;
        let bottom = clip.bottom() - origin.y;
        let mut line_index = layout.line_at_y(top.max(0)).unwrap_or(0) as u32;
        layout.visit_lines(document, top, bottom, |paragraph, line, runs| {
            painter.paint_line(paragraph, line, line_index, runs);
            line_index += 1;
        });

        DisplayList {
            version: document.version(),
            items: painter.items,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn glyph_runs(&self) -> impl Iterator<Item = &DisplayItem> {
        self.items
            .iter()
            .filter(|item| matches!(item, DisplayItem::GlyphRun { .. }))
    }
}

impl Painter<'_> {
    fn paint_line(
        &mut self,
        paragraph: &ScriptParagraph,
        line: &ScriptLine,
        line_index: u32,
        runs: &[VisualRun],
    ) {
        for visual in runs {
            let run = &paragraph.runs[visual.run_index];
            let id = DisplayItemId {
                paragraph_index: paragraph.paragraph_index as u32,
                line_index,
                run_index: visual.run_index as u32,
            };
            let left = visual.left(self.layout_width, self.right_to_left) + self.origin.x;

            if run.kind == RunKind::Object {
                let char_index = paragraph.char_index + run.char_index_in_paragraph;
                if self.is_selected(char_index, char_index + 1) {
                    self.push_selection(left, line, visual.width());
                }
                let bounds = object_box(line, visual, run, self.layout_width, self.right_to_left);
                self.items.push(DisplayItem::Object {
                    id,
                    char_index,
                    bounds: bounds.offset(self.origin),
                });
                continue;
            }
            if visual.slice.glyph_count == 0 {
                continue;
            }

            // Split the slice at the selection edges, keeping logical order
            let slice_start = paragraph.char_index + visual.slice.char_start;
            let slice_end = paragraph.char_index + visual.slice.char_end();
            let mut cuts = vec![slice_start, slice_end];
            if let Some((start, end)) = self.selection {
                for edge in [start, end] {
                    if edge > slice_start && edge < slice_end {
                        cuts.push(edge);
                    }
                }
            }
            cuts.sort_unstable();
            cuts.dedup();

            for piece in cuts.windows(2) {
                let (from, to) = (piece[0] - paragraph.char_index, piece[1] - paragraph.char_index);
                let sub = paragraph.measure_run(
                    visual.run_index,
                    from - run.char_index_in_paragraph,
                    run.char_end_in_paragraph() - to,
                );
                // Offset of the piece from the visual run's left edge
                let into = if run.is_right_to_left() {
                    paragraph.measure_chars(visual.run_index, to, visual.slice.char_end())
                } else {
                    paragraph.measure_chars(visual.run_index, visual.slice.char_start, from)
                };
                let selected = self.is_selected(piece[0], piece[1]);
                if selected {
                    self.push_selection(left + into, line, sub.width);
                }
                self.push_glyphs(paragraph, line, id, left + into, sub, selected, run.style_index);
            }
        }
    }

    fn is_selected(&self, from: usize, to: usize) -> bool {
        self.selection
            .map_or(false, |(start, end)| from >= start && to <= end)
    }

    fn push_selection(&mut self, left: i32, line: &ScriptLine, width: i32) {
        self.items.push(DisplayItem::Selection {
            rect: Rect::new(left, line.y + self.origin.y, width, line.height),
            color: self.options.selected_background_color,
        });
    }

    #[allow(clippy::too_many_arguments)]
    fn push_glyphs(
        &mut self,
        paragraph: &ScriptParagraph,
        line: &ScriptLine,
        id: DisplayItemId,
        left: i32,
        slice: RunSlice,
        selected: bool,
        style_index: usize,
    ) {
        let style = self.document.style(style_index);
        let glyphs = slice.glyph_range();
        self.items.push(DisplayItem::GlyphRun {
            id,
            baseline: Point::new(left, line.y + line.ascent() + self.origin.y),
            font: style.font.clone(),
            color: if selected {
                self.options.selected_text_color
            } else {
                style.color
            },
            glyphs: paragraph.glyphs[glyphs.clone()].to_vec(),
            advances: paragraph.glyph_advances[glyphs.clone()].to_vec(),
            offsets: paragraph.glyph_offsets[glyphs].to_vec(),
            char_index: paragraph.char_index + slice.char_start,
        });
    }
}
