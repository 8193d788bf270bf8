//! Shaped paragraph representation and the line table record

use crate::document::RunKind;
use crate::layout::shaper::{Abc, GlyphId, GlyphOffset, GlyphVisualAttr, LogicalAttr, ScriptAnalysis};

/// A run split so it crosses neither a style/kind boundary nor an item
/// boundary, with its shaping results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRun {
    pub kind: RunKind,
    pub style_index: usize,
    /// Object runs only
    pub object_index: Option<usize>,
    pub requires_tab_expansion: bool,
    pub analysis: ScriptAnalysis,
    pub char_index_in_paragraph: usize,
    pub char_count: usize,
    pub glyph_index_in_paragraph: usize,
    pub glyph_count: usize,
    pub height: i32,
    pub descent: i32,
    pub top_margin: i32,
    pub bottom_margin: i32,
    pub abc: Abc,
}

impl ScriptRun {
    pub fn ascent(&self) -> i32 {
        self.height - self.descent
    }

    pub fn is_right_to_left(&self) -> bool {
        self.analysis.is_right_to_left()
    }

    pub fn char_end_in_paragraph(&self) -> usize {
        self.char_index_in_paragraph + self.char_count
    }

    pub fn glyph_range(&self) -> std::ops::Range<usize> {
        self.glyph_index_in_paragraph..self.glyph_index_in_paragraph + self.glyph_count
    }
}

/// Fully analyzed paragraph, owned by the paragraph cache.
///
/// Per-character arrays are indexed relative to the paragraph start;
/// `logical_clusters` values are glyph indices relative to the owning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptParagraph {
    pub paragraph_index: usize,
    pub char_index: usize,
    pub char_count: usize,
    pub logical_clusters: Vec<u32>,
    pub logical_attrs: Vec<LogicalAttr>,
    pub runs: Vec<ScriptRun>,
    pub glyphs: Vec<GlyphId>,
    pub glyph_advances: Vec<i32>,
    pub glyph_offsets: Vec<GlyphOffset>,
    pub glyph_visual_attrs: Vec<GlyphVisualAttr>,
}

impl ScriptParagraph {
    /// Reset for reuse, keeping allocations
    pub fn clear(&mut self) {
        self.paragraph_index = 0;
        self.char_index = 0;
        self.char_count = 0;
        self.logical_clusters.clear();
        self.logical_attrs.clear();
        self.runs.clear();
        self.glyphs.clear();
        self.glyph_advances.clear();
        self.glyph_offsets.clear();
        self.glyph_visual_attrs.clear();
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Width and glyph span of run `run_index` without `leading` characters
    /// at its logical start and `trailing` characters at its logical end
    pub fn measure_run(&self, run_index: usize, leading: usize, trailing: usize) -> RunSlice {
        let run = &self.runs[run_index];
        let char_start = run.char_index_in_paragraph + leading;
        let char_count = run.char_count.saturating_sub(leading + trailing);
        let whole = RunSlice {
            width: run.abc.total(),
            char_start,
            char_count,
            glyph_start: run.glyph_index_in_paragraph,
            glyph_count: run.glyph_count,
        };
        if run.kind == RunKind::Object || (leading == 0 && trailing == 0) {
            return whole;
        }
        if char_count == 0 {
            return RunSlice {
                width: 0,
                glyph_count: 0,
                ..whole
            };
        }

        let clusters = &self.logical_clusters[run.char_index_in_paragraph..run.char_end_in_paragraph()];
        let first = leading;
        let end = run.char_count - trailing;
        let glyph_total = run.glyph_count as u32;
        // Reversed storage: later characters sit at lower glyph indices
        let (low, high) = if run.is_right_to_left() {
            let low = clusters[end - 1];
            let high = if first > 0 { clusters[first - 1] } else { glyph_total };
            (low, high)
        } else {
            let low = clusters[first];
            let high = if end < run.char_count { clusters[end] } else { glyph_total };
            (low, high)
        };
        let glyph_start = run.glyph_index_in_paragraph + low as usize;
        let glyph_count = high.saturating_sub(low) as usize;
        let width = self.glyph_advances[glyph_start..glyph_start + glyph_count]
            .iter()
            .sum();
        RunSlice {
            width,
            char_start,
            char_count,
            glyph_start,
            glyph_count,
        }
    }

    /// Width of the paragraph-relative characters `from..to` of one run
    pub fn measure_chars(&self, run_index: usize, from: usize, to: usize) -> i32 {
        let run = &self.runs[run_index];
        if to <= from {
            return 0;
        }
        let leading = from - run.char_index_in_paragraph;
        let trailing = run.char_end_in_paragraph() - to;
        self.measure_run(run_index, leading, trailing).width
    }

    /// Index of the run containing paragraph-relative `char_offset`
    pub fn run_at_char(&self, char_offset: usize) -> Option<usize> {
        let after = self
            .runs
            .partition_point(|run| run.char_index_in_paragraph <= char_offset);
        let index = after.checked_sub(1)?;
        (char_offset < self.runs[index].char_end_in_paragraph()).then_some(index)
    }
}

/// Visible part of a script run on one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSlice {
    pub width: i32,
    /// Paragraph-relative
    pub char_start: usize,
    pub char_count: usize,
    /// Index into the paragraph's glyph arrays
    pub glyph_start: usize,
    pub glyph_count: usize,
}

impl RunSlice {
    pub fn char_end(&self) -> usize {
        self.char_start + self.char_count
    }

    pub fn glyph_range(&self) -> std::ops::Range<usize> {
        self.glyph_start..self.glyph_start + self.glyph_count
    }

    pub fn contains_char(&self, char_offset: usize) -> bool {
        (self.char_start..self.char_end()).contains(&char_offset)
    }
}

/// One visual row: a contiguous slice of one paragraph's script runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptLine {
    pub y: i32,
    pub x: i32,
    pub height: i32,
    pub descent: i32,
    pub paragraph_index: usize,
    pub script_run_index: usize,
    pub script_run_count: usize,
    /// Characters of the first run that belong to the previous line
    pub truncated_leading_chars_count: usize,
    /// Characters of the last run that belong to the next line
    pub truncated_trailing_chars_count: usize,
}

impl ScriptLine {
    pub fn ascent(&self) -> i32 {
        self.height - self.descent
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn script_runs(&self) -> std::ops::Range<usize> {
        self.script_run_index..self.script_run_index + self.script_run_count
    }

    /// Leading/trailing truncation applying to the run at `run_index`
    pub fn truncation_for(&self, run_index: usize) -> (usize, usize) {
        let leading = if run_index == self.script_run_index {
            self.truncated_leading_chars_count
        } else {
            0
        };
        let trailing = if run_index + 1 == self.script_run_index + self.script_run_count {
            self.truncated_trailing_chars_count
        } else {
            0
        };
        (leading, trailing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(char_index: usize, char_count: usize) -> ScriptRun {
        ScriptRun {
            kind: RunKind::Text,
            style_index: 0,
            object_index: None,
            requires_tab_expansion: false,
            analysis: ScriptAnalysis::default(),
            char_index_in_paragraph: char_index,
            char_count,
            glyph_index_in_paragraph: char_index,
            glyph_count: char_count,
            height: 16,
            descent: 4,
            top_margin: 0,
            bottom_margin: 0,
            abc: Abc::default(),
        }
    }

    #[test]
    fn test_run_at_char() {
        let paragraph = ScriptParagraph {
            char_count: 9,
            runs: vec![run(0, 4), run(4, 1), run(5, 4)],
            ..ScriptParagraph::default()
        };
        assert_eq!(paragraph.run_at_char(0), Some(0));
        assert_eq!(paragraph.run_at_char(4), Some(1));
        assert_eq!(paragraph.run_at_char(8), Some(2));
        assert_eq!(paragraph.run_at_char(9), None);
        assert_eq!(run(0, 4).ascent(), 12);
    }

    fn measured(rtl: bool) -> ScriptParagraph {
        let mut first = run(0, 4);
        if rtl {
            first.analysis.bidi_level = 1;
        }
        first.abc = Abc { a: 0, b: 40, c: 0 };
        ScriptParagraph {
            char_count: 4,
            // Characters 1 and 2 share a 20-wide cluster
            logical_clusters: if rtl { vec![2, 1, 1, 0] } else { vec![0, 1, 1, 2] },
            glyph_advances: if rtl { vec![5, 20, 15] } else { vec![15, 20, 5] },
            runs: vec![ScriptRun {
                glyph_count: 3,
                ..first
            }],
            ..ScriptParagraph::default()
        }
    }

    #[test]
    fn test_measure_run_left_to_right() {
        let paragraph = measured(false);
        assert_eq!(paragraph.measure_run(0, 0, 0).width, 40);
        let tail = paragraph.measure_run(0, 1, 0);
        assert_eq!((tail.width, tail.glyph_start, tail.glyph_count), (25, 1, 2));
        assert_eq!((tail.char_start, tail.char_count), (1, 3));
        let head = paragraph.measure_run(0, 0, 1);
        assert_eq!((head.width, head.glyph_count), (35, 2));
        assert_eq!(paragraph.measure_chars(0, 0, 1), 15);
        assert_eq!(paragraph.measure_chars(0, 2, 2), 0);
    }

    #[test]
    fn test_measure_run_right_to_left() {
        let paragraph = measured(true);
        // Dropping the logically first char drops the rightmost glyph
        let tail = paragraph.measure_run(0, 1, 0);
        assert_eq!((tail.width, tail.glyph_start, tail.glyph_count), (25, 0, 2));
        let head = paragraph.measure_run(0, 0, 1);
        assert_eq!((head.width, head.glyph_start, head.glyph_count), (35, 1, 2));
        assert!(tail.contains_char(3));
        assert!(!tail.contains_char(0));
    }

    #[test]
    fn test_line_truncation_applies_to_edges() {
        let line = ScriptLine {
            script_run_index: 2,
            script_run_count: 3,
            truncated_leading_chars_count: 1,
            truncated_trailing_chars_count: 2,
            ..ScriptLine::default()
        };
        assert_eq!(line.truncation_for(2), (1, 0));
        assert_eq!(line.truncation_for(3), (0, 0));
        assert_eq!(line.truncation_for(4), (0, 2));

        let single = ScriptLine {
            script_run_index: 0,
            script_run_count: 1,
            truncated_leading_chars_count: 3,
            truncated_trailing_chars_count: 4,
            ..ScriptLine::default()
        };
        assert_eq!(single.truncation_for(0), (3, 4));
    }
}
