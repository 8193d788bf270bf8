//! Font metrics for layout

use crate::document::FontDescriptor;
use crate::layout::shaper::TextShaper;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Vertical metrics of a selected font
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    /// Line height in device units
    pub height: i32,
    /// Distance from the baseline to the bottom of the line
    pub descent: i32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            height: 16,
            descent: 4,
        }
    }
}

impl FontMetrics {
    pub fn new(height: i32, descent: i32) -> Self {
        Self { height, descent }
    }

    pub fn ascent(&self) -> i32 {
        self.height - self.descent
    }
}

/// Advance widths and metrics of one font, as used by the default shaper
#[derive(Debug, Clone)]
pub struct FontFace {
    pub metrics: FontMetrics,
    /// Width of ASCII characters (0-127)
    pub char_widths: Vec<i32>,
    /// Default width for non-ASCII characters
    pub default_width: i32,
}

impl Default for FontFace {
    fn default() -> Self {
        Self::monospace(8, FontMetrics::default())
    }
}

impl FontFace {
    /// Every printable character has the same advance
    pub fn monospace(width: i32, metrics: FontMetrics) -> Self {
        Self {
            metrics,
            char_widths: vec![width; 128],
            default_width: width,
        }
    }

    pub fn with_width(mut self, c: char, width: i32) -> Self {
        if c.is_ascii() {
            self.char_widths[c as usize] = width;
        }
        self
    }

    /// Get width of a character; control characters take no space
    pub fn width(&self, c: char) -> i32 {
        if c.is_control() {
            return 0;
        }
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        self.default_width
    }
}

/// Faces keyed by descriptor, with a fallback for unknown fonts
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    faces: FxHashMap<FontDescriptor, FontFace>,
    fallback: FontFace,
}

impl FontLibrary {
    pub fn new(fallback: FontFace) -> Self {
        Self {
            faces: FxHashMap::default(),
            fallback,
        }
    }

    /// Set the face used for a specific descriptor
    pub fn set(&mut self, font: FontDescriptor, face: FontFace) {
        self.faces.insert(font, face);
    }

    /// Face for `font`, or the fallback face
    pub fn get(&self, font: &FontDescriptor) -> &FontFace {
        self.faces.get(font).unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &FontFace {
        &self.fallback
    }
}

/// Memoized font selection for one layout
#[derive(Debug, Default)]
pub struct MetricsCache {
    entries: FxHashMap<FontDescriptor, FontMetrics>,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&mut self, font: &FontDescriptor, shaper: &mut dyn TextShaper) -> FontMetrics {
        if let Some(metrics) = self.entries.get(font) {
            return *metrics;
        }
        let metrics = shaper.font_metrics(font);
        trace!(family = %font.family, size = font.size, ?metrics, "selected font");
        self.entries.insert(font.clone(), metrics);
        metrics
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
