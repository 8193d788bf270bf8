//! WASM bindings for the text view

pub mod flat_buffer;

use crate::document::Style;
use crate::error::LayoutError;
use crate::layout::{FontFace, FontLibrary, FontMetrics, SimpleShaper, SnapKind};
use crate::{Point, TextView};
use flat_buffer::LineBuffer;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn to_js(err: LayoutError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_style(style_json: Option<String>) -> Result<Style, LayoutError> {
    match style_json {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Style::default()),
    }
}

/// Result of a hit test
#[wasm_bindgen]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WasmSnap {
    /// 0 = none, 1 = leading, 2 = trailing, 3 = exact
    pub kind: u8,
    pub char_index: u32,
}

/// WASM-exposed text view laid out with the default shaper
#[wasm_bindgen]
pub struct WasmTextView {
    view: TextView,
    lines: LineBuffer,
}

#[wasm_bindgen]
impl WasmTextView {
    /// Create a view with a monospace font `char_width` wide
    #[wasm_bindgen(constructor)]
    pub fn new(layout_width: i32, char_width: i32, line_height: i32) -> Result<WasmTextView, JsValue> {
        let metrics = FontMetrics::new(line_height.max(1), line_height.max(1) / 4);
        let shaper = SimpleShaper::new(FontLibrary::new(FontFace::monospace(char_width.max(1), metrics)));
        let mut view = TextView::new(Box::new(shaper));
        view.set_layout_width(layout_width).map_err(to_js)?;
        Ok(Self {
            view,
            lines: LineBuffer::new(),
        })
    }

    /// Append text in `style_json` (a serialized style) or the default style
    #[wasm_bindgen(js_name = appendText)]
    pub fn append_text(&mut self, text: &str, style_json: Option<String>) -> Result<(), JsValue> {
        let style = parse_style(style_json).map_err(to_js)?;
        self.view.append_text(&style, text).map_err(to_js)
    }

    #[wasm_bindgen(js_name = appendLine)]
    pub fn append_line(&mut self, style_json: Option<String>) -> Result<(), JsValue> {
        let style = parse_style(style_json).map_err(to_js)?;
        self.view.append_line(&style).map_err(to_js)
    }

    pub fn clear(&mut self) {
        self.view.clear();
    }

    #[wasm_bindgen(js_name = setLayoutWidth)]
    pub fn set_layout_width(&mut self, width: i32) -> Result<(), JsValue> {
        self.view.set_layout_width(width).map_err(to_js)
    }

    #[wasm_bindgen(js_name = setRightToLeft)]
    pub fn set_right_to_left(&mut self, right_to_left: bool) {
        self.view.set_right_to_left(right_to_left);
    }

    /// Run pending layout; returns the first Y that needs repainting, or -1
    pub fn update(&mut self) -> i32 {
        let diff = self.view.update();
        if diff.is_empty() {
            -1
        } else {
            diff.dirty_top
        }
    }

    #[wasm_bindgen(js_name = isUpdateRequired)]
    pub fn is_update_required(&self) -> bool {
        self.view.is_update_required()
    }

    #[wasm_bindgen(js_name = getHeight)]
    pub fn height(&self) -> i32 {
        self.view.layout.current_layout_height()
    }

    #[wasm_bindgen(js_name = getText)]
    pub fn text(&self) -> String {
        self.view.text()
    }

    #[wasm_bindgen(js_name = snapToChar)]
    pub fn snap_to_char(&mut self, x: i32, y: i32) -> WasmSnap {
        let snap = self.view.snap_to_char(Point::new(x, y), Point::default());
        WasmSnap {
            kind: match snap.kind {
                SnapKind::None => 0,
                SnapKind::Leading => 1,
                SnapKind::Trailing => 2,
                SnapKind::Exact => 3,
            },
            char_index: snap.char_index as u32,
        }
    }

    /// `[x, y, height]` of the caret before `char_index`, empty if the
    /// character is not laid out
    #[wasm_bindgen(js_name = charPosition)]
    pub fn char_position(&mut self, char_index: u32) -> Vec<i32> {
        self.view
            .char_position(char_index as usize)
            .map(|caret| vec![caret.x, caret.y, caret.height])
            .unwrap_or_default()
    }

    /// Line table in the flat format described in [`flat_buffer`]
    #[wasm_bindgen(js_name = getLineBuffer)]
    pub fn line_buffer(&mut self) -> js_sys::Int32Array {
        self.fill_lines();
        js_sys::Int32Array::from(self.lines.as_slice())
    }

    fn fill_lines(&mut self) {
        let TextView { document, layout } = &mut self.view;
        self.lines.fill(document, layout);
    }
}
