//! Text shaping service boundary
//!
//! Layout never shapes text itself. Itemization, break analysis, glyph
//! shaping, placement, visual reordering and x-to-character mapping are
//! requested through [`TextShaper`], so hosts can plug in a platform
//! shaper and tests can use a deterministic one.

use crate::document::FontDescriptor;
use crate::layout::font::FontMetrics;
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;
use unicode_bidi::{BidiInfo, Level};

/// Glyph index within a font
pub type GlyphId = u32;

/// Four-letter ISO 15924 script code
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptTag(pub [u8; 4]);

impl ScriptTag {
    /// Script not known to the shaper; shaped without script-specific rules
    pub const UNKNOWN: ScriptTag = ScriptTag(*b"Zzzz");

    pub fn from_name(name: &str) -> Self {
        let mut tag = *b"Zzzz";
        for (slot, byte) in tag.iter_mut().zip(name.bytes()) {
            *slot = byte;
        }
        ScriptTag(tag)
    }
}

impl Default for ScriptTag {
    fn default() -> Self {
        ScriptTag::UNKNOWN
    }
}

impl fmt::Display for ScriptTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            fmt::Write::write_char(f, byte as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ScriptTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptTag({})", self)
    }
}

/// Direction and script state of an item or script run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptAnalysis {
    pub bidi_level: u8,
    pub script: ScriptTag,
}

impl ScriptAnalysis {
    pub fn is_right_to_left(&self) -> bool {
        self.bidi_level & 1 == 1
    }
}

/// Start of a direction- and script-homogeneous span, relative to the
/// itemized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptItem {
    pub char_index: usize,
    pub analysis: ScriptAnalysis,
}

/// Per-character break properties
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct LogicalAttr(u8);

impl LogicalAttr {
    /// A line may break before this character
    pub const SOFT_BREAK: u8 = 0b0001;
    pub const WHITE_SPACE: u8 = 0b0010;
    /// The caret may stop before this character
    pub const CHAR_STOP: u8 = 0b0100;
    pub const WORD_STOP: u8 = 0b1000;

    pub fn from_bits(bits: u8) -> Self {
        LogicalAttr(bits & 0b1111)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn soft_break(&self) -> bool {
        self.0 & Self::SOFT_BREAK != 0
    }

    pub fn white_space(&self) -> bool {
        self.0 & Self::WHITE_SPACE != 0
    }

    pub fn char_stop(&self) -> bool {
        self.0 & Self::CHAR_STOP != 0
    }

    pub fn word_stop(&self) -> bool {
        self.0 & Self::WORD_STOP != 0
    }

    pub fn is_soft_break_or_white_space(&self) -> bool {
        self.0 & (Self::SOFT_BREAK | Self::WHITE_SPACE) != 0
    }

    pub fn insert(&mut self, bits: u8) {
        self.0 |= bits;
    }
}

impl fmt::Debug for LogicalAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicalAttr({:04b})", self.0)
    }
}

/// Leading space, ink width and trailing space of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Abc {
    pub a: i32,
    pub b: i32,
    pub c: i32,
}

impl Abc {
    pub fn total(&self) -> i32 {
        self.a + self.b + self.c
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphOffset {
    pub du: i32,
    pub dv: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphVisualAttr {
    pub cluster_start: bool,
    pub zero_width: bool,
}

/// Output buffers of [`TextShaper::shape`].
///
/// Glyphs are stored in visual order (right-to-left runs are reversed).
/// `logical_clusters[c]` is the storage index of the first glyph of the
/// cluster containing character `c`.
#[derive(Debug, Clone, Default)]
pub struct ShapedText {
    pub glyphs: Vec<GlyphId>,
    pub visual_attrs: Vec<GlyphVisualAttr>,
    pub logical_clusters: Vec<u32>,
}

impl ShapedText {
    pub fn clear(&mut self) {
        self.glyphs.clear();
        self.visual_attrs.clear();
        self.logical_clusters.clear();
    }
}

/// Where an x coordinate falls within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharHit {
    pub char_offset: usize,
    /// The coordinate is on the character's trailing half
    pub trailing: bool,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("script {0} is not supported by the selected font")]
    ScriptNotInFont(ScriptTag),
}

/// Text shaping and metrics capability consumed by layout
pub trait TextShaper {
    /// Metrics of the font selected for `font`
    fn font_metrics(&mut self, font: &FontDescriptor) -> FontMetrics;

    /// Split `chars` into items; the first item starts at 0
    fn itemize(&mut self, chars: &[char], right_to_left: bool, items: &mut Vec<ScriptItem>);

    /// Fill `attrs` (same length as `chars`) for one item
    fn break_attributes(
        &mut self,
        chars: &[char],
        analysis: &ScriptAnalysis,
        attrs: &mut [LogicalAttr],
    );

    fn shape(
        &mut self,
        font: &FontDescriptor,
        chars: &[char],
        analysis: &ScriptAnalysis,
        out: &mut ShapedText,
    ) -> Result<(), ShapeError>;

    /// Fill advances and offsets (one per glyph) and return the run's ABC width
    fn place(
        &mut self,
        font: &FontDescriptor,
        glyphs: &[GlyphId],
        visual_attrs: &[GlyphVisualAttr],
        analysis: &ScriptAnalysis,
        advances: &mut [i32],
        offsets: &mut [GlyphOffset],
    ) -> Abc;

    /// Visual position → logical index permutation for runs at `levels`
    fn visual_order(&mut self, levels: &[u8], visual_to_logical: &mut Vec<usize>) {
        let levels: SmallVec<[Level; 16]> = levels
            .iter()
            .map(|&level| Level::new(level).unwrap_or_else(|_| Level::ltr()))
            .collect();
        visual_to_logical.clear();
        visual_to_logical.extend(BidiInfo::reorder_visual(&levels));
    }

    /// Character of a (possibly truncated) run under `x`, measured from the
    /// run's left edge
    fn x_to_char(
        &mut self,
        x: i32,
        logical_clusters: &[u32],
        advances: &[i32],
        analysis: &ScriptAnalysis,
    ) -> CharHit {
        cluster_x_to_char(x, logical_clusters, advances, analysis.is_right_to_left())
    }
}

/// Cluster walk shared by shapers whose clusters split evenly among their
/// characters
pub fn cluster_x_to_char(
    x: i32,
    logical_clusters: &[u32],
    advances: &[i32],
    right_to_left: bool,
) -> CharHit {
    let char_count = logical_clusters.len();
    if char_count == 0 {
        return CharHit {
            char_offset: 0,
            trailing: false,
        };
    }
    let total: i32 = advances.iter().sum();
    // Past either edge: snap to the visually outermost character
    if x < 0 || advances.is_empty() {
        return if right_to_left {
            CharHit {
                char_offset: char_count - 1,
                trailing: true,
            }
        } else {
            CharHit {
                char_offset: 0,
                trailing: false,
            }
        };
    }
    if x >= total {
        return if right_to_left {
            CharHit {
                char_offset: 0,
                trailing: false,
            }
        } else {
            CharHit {
                char_offset: char_count - 1,
                trailing: true,
            }
        };
    }

    let mut glyph = 0;
    let mut glyph_x = 0;
    while glyph + 1 < advances.len() && glyph_x + advances[glyph] <= x {
        glyph_x += advances[glyph];
        glyph += 1;
    }

    let cluster_start = logical_clusters
        .iter()
        .map(|&g| g as usize)
        .filter(|&g| g <= glyph)
        .max()
        .unwrap_or(0);
    let cluster_end = logical_clusters
        .iter()
        .map(|&g| g as usize)
        .filter(|&g| g > cluster_start)
        .min()
        .unwrap_or(advances.len());
    let first_char = logical_clusters
        .iter()
        .position(|&g| g as usize == cluster_start)
        .unwrap_or(0);
    let chars_in_cluster = logical_clusters
        .iter()
        .filter(|&&g| g as usize == cluster_start)
        .count()
        .max(1) as i32;

    let cluster_x: i32 = advances[..cluster_start].iter().sum();
    let cluster_width: i32 = advances[cluster_start..cluster_end].iter().sum();
    let into = x - cluster_x;
    if cluster_width <= 0 {
        return CharHit {
            char_offset: first_char,
            trailing: false,
        };
    }

    // Split the cluster evenly between its characters
    let part = ((into * chars_in_cluster) / cluster_width).clamp(0, chars_in_cluster - 1);
    let part_x = into * chars_in_cluster - part * cluster_width;
    let in_right_half = part_x * 2 >= cluster_width;

    if right_to_left {
        CharHit {
            char_offset: first_char + (chars_in_cluster - 1 - part) as usize,
            trailing: !in_right_half,
        }
    } else {
        CharHit {
            char_offset: first_char + part as usize,
            trailing: in_right_half,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_attr_bits() {
        let mut attr = LogicalAttr::default();
        assert!(!attr.is_soft_break_or_white_space());
        attr.insert(LogicalAttr::WHITE_SPACE | LogicalAttr::CHAR_STOP);
        assert!(attr.white_space());
        assert!(attr.char_stop());
        assert!(!attr.soft_break());
        assert!(attr.is_soft_break_or_white_space());
        assert_eq!(LogicalAttr::from_bits(0xFF).bits(), 0b1111);
    }

    #[test]
    fn test_script_tag() {
        assert_eq!(ScriptTag::from_name("Latn").to_string(), "Latn");
        assert_eq!(ScriptTag::from_name("Ar"), ScriptTag(*b"Arzz"));
        assert_eq!(ScriptTag::default(), ScriptTag::UNKNOWN);
    }

    #[test]
    fn test_x_to_char_left_to_right() {
        let clusters = [0, 1, 2];
        let advances = [10, 10, 10];
        assert_eq!(
            cluster_x_to_char(12, &clusters, &advances, false),
            CharHit { char_offset: 1, trailing: false }
        );
        assert_eq!(
            cluster_x_to_char(17, &clusters, &advances, false),
            CharHit { char_offset: 1, trailing: true }
        );
        assert_eq!(
            cluster_x_to_char(-3, &clusters, &advances, false),
            CharHit { char_offset: 0, trailing: false }
        );
        assert_eq!(
            cluster_x_to_char(45, &clusters, &advances, false),
            CharHit { char_offset: 2, trailing: true }
        );
    }

    #[test]
    fn test_x_to_char_right_to_left() {
        // Glyphs reversed: char 0 is drawn rightmost
        let clusters = [2, 1, 0];
        let advances = [10, 10, 10];
        assert_eq!(cluster_x_to_char(25, &clusters, &advances, true).char_offset, 0);
        assert_eq!(cluster_x_to_char(3, &clusters, &advances, true).char_offset, 2);
        assert!(!cluster_x_to_char(27, &clusters, &advances, true).trailing);
        assert!(cluster_x_to_char(21, &clusters, &advances, true).trailing);
    }

    #[test]
    fn test_x_to_char_shared_cluster() {
        // Two characters forming one 20-wide glyph
        let clusters = [0, 0, 1];
        let advances = [20, 10];
        assert_eq!(cluster_x_to_char(4, &clusters, &advances, false).char_offset, 0);
        assert_eq!(cluster_x_to_char(14, &clusters, &advances, false).char_offset, 1);
        assert_eq!(cluster_x_to_char(24, &clusters, &advances, false).char_offset, 2);
    }

    struct OrderOnly;

    impl TextShaper for OrderOnly {
        fn font_metrics(&mut self, _font: &FontDescriptor) -> FontMetrics {
            FontMetrics::default()
        }
        fn itemize(&mut self, _chars: &[char], _rtl: bool, _items: &mut Vec<ScriptItem>) {}
        fn break_attributes(&mut self, _: &[char], _: &ScriptAnalysis, _: &mut [LogicalAttr]) {}
        fn shape(
            &mut self,
            _: &FontDescriptor,
            _: &[char],
            _: &ScriptAnalysis,
            _: &mut ShapedText,
        ) -> Result<(), ShapeError> {
            Ok(())
        }
        fn place(
            &mut self,
            _: &FontDescriptor,
            _: &[GlyphId],
            _: &[GlyphVisualAttr],
            _: &ScriptAnalysis,
            _: &mut [i32],
            _: &mut [GlyphOffset],
        ) -> Abc {
            Abc::default()
        }
    }

    #[test]
    fn test_default_visual_order() {
        let mut shaper = OrderOnly;
        let mut order = Vec::new();
        shaper.visual_order(&[0, 1, 1, 0], &mut order);
        assert_eq!(order, vec![0, 2, 1, 3]);
        shaper.visual_order(&[1, 1, 2], &mut order);
        assert_eq!(order, vec![2, 1, 0]);
    }
}
