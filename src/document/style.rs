//! Immutable style values and tab-stop policies

use serde::{Deserialize, Serialize};

/// Font selection carried by a style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FontDescriptor {
    pub family: String,
    /// Em size in device units
    pub size: u16,
    pub bold: bool,
    pub italic: bool,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 14,
            bold: false,
            italic: false,
        }
    }
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size: u16) -> Self {
        Self {
            family: family.into(),
            size,
            ..Self::default()
        }
    }
}

/// Packed 0xAARRGGBB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const HIGHLIGHT: Color = Color(0xFF33_99FF);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color(0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Where tab characters advance to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TabStopRuler {
    /// Stops every `stop_width` units; a tab always advances at least `min_width`.
    #[serde(rename_all = "camelCase")]
    Pixel { stop_width: i32, min_width: i32 },
    /// Explicit ascending stops, then regular stops every `fallback_width`.
    #[serde(rename_all = "camelCase")]
    Positions { stops: Vec<i32>, fallback_width: i32 },
}

impl Default for TabStopRuler {
    fn default() -> Self {
        TabStopRuler::Pixel {
            stop_width: 60,
            min_width: 0,
        }
    }
}

impl TabStopRuler {
    pub fn pixel(stop_width: i32, min_width: i32) -> Self {
        TabStopRuler::Pixel {
            stop_width: stop_width.max(1),
            min_width: min_width.max(0),
        }
    }

    /// X of the next tab stop strictly after `x`.
    pub fn advance_to_next_tab_stop(&self, x: i32) -> i32 {
        match self {
            TabStopRuler::Pixel {
                stop_width,
                min_width,
            } => next_multiple(x, *stop_width, *min_width),
            TabStopRuler::Positions {
                stops,
                fallback_width,
            } => stops
                .iter()
                .copied()
                .find(|&stop| stop > x)
                .unwrap_or_else(|| next_multiple(x, *fallback_width, 0)),
        }
    }
}

fn next_multiple(x: i32, stop_width: i32, min_width: i32) -> i32 {
    let stop_width = stop_width.max(1);
    let target = x + min_width.max(0);
    let mut stop = (target.div_euclid(stop_width) + i32::from(target.rem_euclid(stop_width) != 0))
        * stop_width;
    if stop <= x {
        stop += stop_width;
    }
    stop
}

/// Visual attributes of a span of text or an embedded object.
///
/// Styles are compared structurally; two equal styles intern to one index.
/// Paragraph-level fields (margins, indent, wrap, tabs) are read from the
/// style of the paragraph's first run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Style {
    pub font: FontDescriptor,
    pub color: Color,
    pub left_margin: i32,
    pub right_margin: i32,
    pub first_line_indent: i32,
    pub word_wrap: bool,
    pub tab_stop_ruler: TabStopRuler,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font: FontDescriptor::default(),
            color: Color::BLACK,
            left_margin: 0,
            right_margin: 0,
            first_line_indent: 0,
            word_wrap: true,
            tab_stop_ruler: TabStopRuler::default(),
        }
    }
}

impl Style {
    pub fn builder() -> StyleBuilder {
        StyleBuilder::default()
    }

    /// Derive a builder seeded with this style's values
    pub fn to_builder(&self) -> StyleBuilder {
        StyleBuilder {
            style: self.clone(),
        }
    }
}

/// Fluent construction of [`Style`] values
#[derive(Debug, Clone, Default)]
pub struct StyleBuilder {
    style: Style,
}

impl StyleBuilder {
    pub fn font(mut self, font: FontDescriptor) -> Self {
        self.style.font = font;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.style.color = color;
        self
    }

    pub fn margins(mut self, left: i32, right: i32) -> Self {
        self.style.left_margin = left;
        self.style.right_margin = right;
        self
    }

    pub fn first_line_indent(mut self, indent: i32) -> Self {
        self.style.first_line_indent = indent;
        self
    }

    pub fn word_wrap(mut self, word_wrap: bool) -> Self {
        self.style.word_wrap = word_wrap;
        self
    }

    pub fn tab_stop_ruler(mut self, ruler: TabStopRuler) -> Self {
        self.style.tab_stop_ruler = ruler;
        self
    }

    pub fn build(self) -> Style {
        self.style
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_ruler_without_minimum() {
        let ruler = TabStopRuler::pixel(60, 0);
        assert_eq!(ruler.advance_to_next_tab_stop(0), 60);
        assert_eq!(ruler.advance_to_next_tab_stop(50), 60);
        assert_eq!(ruler.advance_to_next_tab_stop(59), 60);
        // Already on a stop: move to the next one
        assert_eq!(ruler.advance_to_next_tab_stop(60), 120);
    }

    #[test]
    fn test_pixel_ruler_with_minimum() {
        let ruler = TabStopRuler::pixel(60, 15);
        assert_eq!(ruler.advance_to_next_tab_stop(40), 60);
        assert_eq!(ruler.advance_to_next_tab_stop(50), 120);
    }

    #[test]
    fn test_explicit_positions_fall_back_to_pixels() {
        let ruler = TabStopRuler::Positions {
            stops: vec![25, 100],
            fallback_width: 50,
        };
        assert_eq!(ruler.advance_to_next_tab_stop(0), 25);
        assert_eq!(ruler.advance_to_next_tab_stop(25), 100);
        assert_eq!(ruler.advance_to_next_tab_stop(130), 150);
    }

    #[test]
    fn test_structural_equality() {
        let a = Style::builder().color(Color::rgb(255, 0, 0)).build();
        let b = Style::builder().color(Color::rgb(255, 0, 0)).build();
        assert_eq!(a, b);
        assert_ne!(a, Style::default());
        assert_eq!(a.to_builder().word_wrap(false).build().color, a.color);
    }

    #[test]
    fn test_style_from_partial_json() {
        let style: Style =
            serde_json::from_str(r#"{"leftMargin": 8, "wordWrap": false}"#).unwrap();
        assert_eq!(style.left_margin, 8);
        assert!(!style.word_wrap);
        assert_eq!(style.font, FontDescriptor::default());
    }
}
