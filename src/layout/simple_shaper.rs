//! Deterministic shaper built on the Unicode crates
//!
//! One glyph per grapheme cluster, advances from a [`FontLibrary`]. Good
//! enough for terminals, tests and monospace hosts; real hosts supply a
//! platform shaper.

use crate::document::FontDescriptor;
use crate::layout::font::{FontFace, FontLibrary, FontMetrics};
use crate::layout::shaper::{
    Abc, GlyphId, GlyphOffset, GlyphVisualAttr, LogicalAttr, ScriptAnalysis, ScriptItem,
    ScriptTag, ShapeError, ShapedText, TextShaper,
};
use unicode_bidi::{BidiInfo, Level};
use unicode_script::{Script, UnicodeScript};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Default)]
pub struct SimpleShaper {
    fonts: FontLibrary,
}

impl SimpleShaper {
    pub fn new(fonts: FontLibrary) -> Self {
        Self { fonts }
    }

    /// Every font has the same fixed advance and metrics
    pub fn monospace(width: i32, metrics: FontMetrics) -> Self {
        Self::new(FontLibrary::new(FontFace::monospace(width, metrics)))
    }

    pub fn fonts(&self) -> &FontLibrary {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontLibrary {
        &mut self.fonts
    }
}

/// Char index of every byte offset at which a char starts
fn char_starts(text: &str) -> Vec<usize> {
    text.char_indices().map(|(byte, _)| byte).collect()
}

fn char_index_of(starts: &[usize], byte: usize) -> Option<usize> {
    starts.binary_search(&byte).ok()
}

/// Script per character. Common and Inherited characters join the item
/// before them when they share its bidi level, otherwise the next one.
fn resolved_scripts(chars: &[char], levels: &[u8]) -> Vec<ScriptTag> {
    let raw: Vec<Option<Script>> = chars
        .iter()
        .map(|c| match c.script() {
            Script::Common | Script::Inherited | Script::Unknown => None,
            script => Some(script),
        })
        .collect();

    let mut resolved: Vec<ScriptTag> = Vec::with_capacity(chars.len());
    for i in 0..chars.len() {
        let tag = match raw[i] {
            Some(script) => ScriptTag::from_name(script.short_name()),
            None if i > 0 && levels[i] == levels[i - 1] => resolved[i - 1],
            None => raw[i + 1..]
                .iter()
                .flatten()
                .next()
                .map(|script| ScriptTag::from_name(script.short_name()))
                .or_else(|| resolved.last().copied())
                .unwrap_or(ScriptTag::UNKNOWN),
        };
        resolved.push(tag);
    }
    resolved
}

impl TextShaper for SimpleShaper {
    fn font_metrics(&mut self, font: &FontDescriptor) -> FontMetrics {
        self.fonts.get(font).metrics
    }

    fn itemize(&mut self, chars: &[char], right_to_left: bool, items: &mut Vec<ScriptItem>) {
        items.clear();
        if chars.is_empty() {
            return;
        }
        let text: String = chars.iter().collect();
        let paragraph_level = if right_to_left { Level::rtl() } else { Level::ltr() };
        let bidi = BidiInfo::new(&text, Some(paragraph_level));
        let levels: Vec<u8> = text
            .char_indices()
            .map(|(byte, _)| bidi.levels[byte].number())
            .collect();
        let scripts = resolved_scripts(chars, &levels);

        let mut current: Option<ScriptAnalysis> = None;
        for (i, (&bidi_level, &script)) in levels.iter().zip(&scripts).enumerate() {
            let analysis = ScriptAnalysis { bidi_level, script };
            if current != Some(analysis) {
                items.push(ScriptItem {
                    char_index: i,
                    analysis,
                });
                current = Some(analysis);
            }
        }
    }

    fn break_attributes(
        &mut self,
        chars: &[char],
        _analysis: &ScriptAnalysis,
        attrs: &mut [LogicalAttr],
    ) {
        attrs.fill(LogicalAttr::default());
        let text: String = chars.iter().collect();
        let starts = char_starts(&text);

        for (byte, _opportunity) in unicode_linebreak::linebreaks(&text) {
            if let Some(i) = char_index_of(&starts, byte) {
                attrs[i].insert(LogicalAttr::SOFT_BREAK);
            }
        }
        for (byte, _) in text.grapheme_indices(true) {
            if let Some(i) = char_index_of(&starts, byte) {
                attrs[i].insert(LogicalAttr::CHAR_STOP);
            }
        }
        for (byte, word) in text.split_word_bound_indices() {
            if word.chars().any(|c| !c.is_whitespace()) {
                if let Some(i) = char_index_of(&starts, byte) {
                    attrs[i].insert(LogicalAttr::WORD_STOP);
                }
            }
        }
        for (attr, c) in attrs.iter_mut().zip(chars) {
            if c.is_whitespace() {
                attr.insert(LogicalAttr::WHITE_SPACE);
            }
        }
    }

    fn shape(
        &mut self,
        _font: &FontDescriptor,
        chars: &[char],
        analysis: &ScriptAnalysis,
        out: &mut ShapedText,
    ) -> Result<(), ShapeError> {
        out.clear();
        let text: String = chars.iter().collect();
        let starts = char_starts(&text);

        // (first char, char count) per cluster in logical order
        let clusters: Vec<(usize, usize)> = text
            .grapheme_indices(true)
            .filter_map(|(byte, cluster)| {
                char_index_of(&starts, byte).map(|i| (i, cluster.chars().count()))
            })
            .collect();
        let glyph_count = clusters.len();
        let rtl = analysis.is_right_to_left();

        out.glyphs.resize(glyph_count, 0);
        out.visual_attrs
            .resize(glyph_count, GlyphVisualAttr::default());
        out.logical_clusters.resize(chars.len(), 0);

        for (k, &(first, count)) in clusters.iter().enumerate() {
            let storage = if rtl { glyph_count - 1 - k } else { k };
            let base = chars[first];
            out.glyphs[storage] = base as GlyphId;
            out.visual_attrs[storage] = GlyphVisualAttr {
                cluster_start: true,
                zero_width: base.is_control(),
            };
            for slot in &mut out.logical_clusters[first..first + count] {
                *slot = storage as u32;
            }
        }
        Ok(())
    }

    fn place(
        &mut self,
        font: &FontDescriptor,
        glyphs: &[GlyphId],
        _visual_attrs: &[GlyphVisualAttr],
        _analysis: &ScriptAnalysis,
        advances: &mut [i32],
        offsets: &mut [GlyphOffset],
    ) -> Abc {
        let face = self.fonts.get(font);
        let mut width = 0;
        for ((glyph, advance), offset) in glyphs.iter().zip(advances.iter_mut()).zip(offsets) {
            *advance = char::from_u32(*glyph).map_or(face.default_width, |c| face.width(c));
            *offset = GlyphOffset::default();
            width += *advance;
        }
        Abc {
            a: 0,
            b: width,
            c: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    fn shaper() -> SimpleShaper {
        SimpleShaper::monospace(10, FontMetrics::new(16, 4))
    }

    #[test]
    fn test_itemize_latin() {
        let mut items = Vec::new();
        shaper().itemize(&chars("Hello, world\n"), false, &mut items);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].char_index, 0);
        assert_eq!(items[0].analysis.bidi_level, 0);
        assert_eq!(items[0].analysis.script, ScriptTag(*b"Latn"));
    }

    #[test]
    fn test_itemize_mixed_direction() {
        let mut items = Vec::new();
        // "abc " + three Hebrew letters + " def"
        let text = chars("abc \u{5D0}\u{5D1}\u{5D2} def");
        shaper().itemize(&text, false, &mut items);
        let starts: Vec<_> = items.iter().map(|i| i.char_index).collect();
        assert_eq!(starts, vec![0, 4, 7]);
        assert!(!items[0].analysis.is_right_to_left());
        assert!(items[1].analysis.is_right_to_left());
        assert_eq!(items[1].analysis.script, ScriptTag(*b"Hebr"));
        assert!(!items[2].analysis.is_right_to_left());
    }

    #[test]
    fn test_itemize_right_to_left_paragraph() {
        let mut items = Vec::new();
        shaper().itemize(&chars("abc"), true, &mut items);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].analysis.bidi_level, 2);
    }

    #[test]
    fn test_break_attributes() {
        let text = chars("aaaa bbbb");
        let mut attrs = vec![LogicalAttr::default(); text.len()];
        shaper().break_attributes(&text, &ScriptAnalysis::default(), &mut attrs);
        assert!(attrs[4].white_space());
        assert!(attrs[5].soft_break());
        assert!(!attrs[2].soft_break());
        assert!(attrs[0].word_stop());
        assert!(attrs[5].word_stop());
        assert!(attrs.iter().all(|a| a.char_stop()));
    }

    #[test]
    fn test_shape_and_place() {
        let mut shaper = shaper();
        let text = chars("ab\u{301}c");
        let mut shaped = ShapedText::default();
        let analysis = ScriptAnalysis::default();
        let font = FontDescriptor::default();
        shaper.shape(&font, &text, &analysis, &mut shaped).unwrap();
        assert_eq!(shaped.glyphs.len(), 3);
        assert_eq!(shaped.logical_clusters, vec![0, 1, 1, 2]);

        let mut advances = vec![0; 3];
        let mut offsets = vec![GlyphOffset::default(); 3];
        let abc = shaper.place(&font, &shaped.glyphs, &shaped.visual_attrs, &analysis, &mut advances, &mut offsets);
        assert_eq!(advances, vec![10, 10, 10]);
        assert_eq!(abc.total(), 30);
    }

    #[test]
    fn test_shape_right_to_left_reverses_glyphs() {
        let mut shaper = shaper();
        let text = chars("\u{5D0}\u{5D1}\u{5D2}");
        let mut shaped = ShapedText::default();
        let analysis = ScriptAnalysis {
            bidi_level: 1,
            script: ScriptTag(*b"Hebr"),
        };
        shaper
            .shape(&FontDescriptor::default(), &text, &analysis, &mut shaped)
            .unwrap();
        assert_eq!(shaped.logical_clusters, vec![2, 1, 0]);
        assert_eq!(shaped.glyphs[0], '\u{5D2}' as GlyphId);
    }
}
