//! Line breaking: packs a paragraph's script runs into lines

use crate::document::{Document, RunKind, Style, TabStopRuler};
use crate::layout::script::{ScriptLine, ScriptParagraph};

/// Splits analyzed paragraphs into lines for a given width.
///
/// Horizontal positions are measured from the paragraph's content edge
/// (after the left margin), so a line may hold `width - left - right`
/// units. Whitespace at a break hangs past the edge and stays on the line
/// it ends.
#[derive(Debug, Clone, Copy)]
pub struct LineBreaker {
    minimum_line_height: i32,
}

impl Default for LineBreaker {
    fn default() -> Self {
        Self::new(1)
    }
}

impl LineBreaker {
    pub fn new(minimum_line_height: i32) -> Self {
        Self {
            minimum_line_height: minimum_line_height.max(0),
        }
    }

    /// Append the lines of `paragraph` to `lines`, starting at `*height`,
    /// and advance `*height` past them. Always appends at least one line.
    ///
    /// Expands tab runs in place, so the paragraph's tab advances reflect
    /// the positions they were laid out at.
    pub fn append_lines(
        &self,
        document: &Document,
        paragraph: &mut ScriptParagraph,
        layout_width: i32,
        right_to_left: bool,
        lines: &mut Vec<ScriptLine>,
        height: &mut i32,
    ) {
        let mut line = ScriptLine {
            y: *height,
            paragraph_index: paragraph.paragraph_index,
            ..ScriptLine::default()
        };

        let run_count = paragraph.runs.len();
        if run_count == 0 {
            line.height = self.minimum_line_height;
            *height += line.height;
            lines.push(line);
            return;
        }

        let style = document.style(paragraph.runs[0].style_index);
        line.x = style.left_margin + style.first_line_indent;
        let max_x = layout_width - style.left_margin - style.right_margin;

        if let Some(simple) = self.single_line_width(paragraph, style, max_x) {
            debug_assert!(simple <= max_x || !style.word_wrap);
            line.script_run_count = run_count;
            self.push_line(line, paragraph, lines, height);
            return;
        }

        let chars = paragraph_chars(document, paragraph);
        let ruler = &style.tab_stop_ruler;
        let mut x = style.first_line_indent;
        let mut run_index = 0;
        let mut break_char = 0;
        let mut break_run = 0;

        'runs: while run_index < run_count {
            let first_char_on_line = paragraph.runs[line.script_run_index].char_index_in_paragraph
                + line.truncated_leading_chars_count;

            let (start, end, expand_tabs) = {
                let run = &paragraph.runs[run_index];
                let start = if run_index == line.script_run_index {
                    first_char_on_line
                } else {
                    run.char_index_in_paragraph
                };
                let expand = run.requires_tab_expansion && run.is_right_to_left() == right_to_left;
                (start, run.char_end_in_paragraph(), expand)
            };

            let mut walker = CharWalker::new(paragraph, run_index, start);
            let mut overflow_char = None;
            for char_offset in start..end {
                let attr = paragraph.logical_attrs[char_offset];
                if attr.is_soft_break_or_white_space()
                    && (char_offset == first_char_on_line
                        || !paragraph.logical_attrs[char_offset - 1].white_space())
                {
                    break_char = char_offset;
                    break_run = run_index;
                }

                x = walker.advance(paragraph, chars, char_offset, x, ruler, expand_tabs);
                if x > max_x && style.word_wrap {
                    overflow_char = Some(char_offset);
                    break;
                }
            }
            let Some(overflow_char) = overflow_char else {
                run_index += 1;
                continue;
            };

            // Without a useful break opportunity, break before the character
            // that overflowed, keeping at least one character on the line
            if break_char <= first_char_on_line {
                break_run = run_index;
                break_char = overflow_char.max(first_char_on_line + 1);
            }

            // Let trailing whitespace of the line's own direction hang
            loop {
                let run = &paragraph.runs[break_run];
                if break_char - run.char_index_in_paragraph == run.char_count {
                    break_run += 1;
                }
                if break_char == paragraph.char_count {
                    break 'runs;
                }
                if paragraph.runs[break_run].is_right_to_left() != right_to_left
                    || !paragraph.logical_attrs[break_char].white_space()
                {
                    break;
                }
                break_char += 1;
            }

            let offset = break_char - paragraph.runs[break_run].char_index_in_paragraph;
            if offset == 0 {
                line.script_run_count = break_run - line.script_run_index;
            } else {
                line.script_run_count = break_run - line.script_run_index + 1;
                line.truncated_trailing_chars_count = paragraph.runs[break_run].char_count - offset;
            }
            self.push_line(line, paragraph, lines, height);

            line = ScriptLine {
                y: *height,
                x: style.left_margin,
                paragraph_index: paragraph.paragraph_index,
                script_run_index: break_run,
                truncated_leading_chars_count: offset,
                ..ScriptLine::default()
            };
            x = 0;
            run_index = break_run;
        }

        line.script_run_count = run_count - line.script_run_index;
        self.push_line(line, paragraph, lines, height);
    }

    /// Recompute tab advances of a freshly analyzed paragraph from the
    /// lines it was previously broken into
    pub fn reexpand_tabs(
        &self,
        document: &Document,
        paragraph: &mut ScriptParagraph,
        lines: &[ScriptLine],
        right_to_left: bool,
    ) {
        if paragraph.runs.is_empty() || !paragraph.runs.iter().any(|run| run.requires_tab_expansion) {
            return;
        }
        let style = document.style(paragraph.runs[0].style_index);
        let chars = paragraph_chars(document, paragraph);
        let ruler = &style.tab_stop_ruler;

        for (line_number, line) in lines.iter().enumerate() {
            let mut x = if line_number == 0 {
                style.first_line_indent
            } else {
                0
            };
            for run_index in line.script_runs() {
                let (leading, trailing) = line.truncation_for(run_index);
                let run = &paragraph.runs[run_index];
                if !(run.requires_tab_expansion && run.is_right_to_left() == right_to_left) {
                    x += paragraph.measure_run(run_index, leading, trailing).width;
                    continue;
                }
                let start = run.char_index_in_paragraph + leading;
                let end = run.char_end_in_paragraph() - trailing;
                let mut walker = CharWalker::new(paragraph, run_index, start);
                for char_offset in start..end {
                    x = walker.advance(paragraph, chars, char_offset, x, ruler, true);
                }
            }
        }
    }

    /// Width of the paragraph when it fits on one line without tab
    /// expansion, `None` when the full breaking pass is needed
    fn single_line_width(
        &self,
        paragraph: &ScriptParagraph,
        style: &Style,
        max_x: i32,
    ) -> Option<i32> {
        let mut x = style.first_line_indent;
        for run in &paragraph.runs {
            if run.requires_tab_expansion {
                return None;
            }
            x += run.abc.total();
            if x > max_x && style.word_wrap {
                return None;
            }
        }
        Some(x)
    }

    fn push_line(
        &self,
        mut line: ScriptLine,
        paragraph: &ScriptParagraph,
        lines: &mut Vec<ScriptLine>,
        height: &mut i32,
    ) {
        let mut ascent = self.minimum_line_height;
        let mut descent = 0;
        for run in &paragraph.runs[line.script_runs()] {
            ascent = ascent.max(run.ascent() + run.top_margin);
            descent = descent.max(run.descent + run.bottom_margin);
        }
        line.height = ascent + descent;
        line.descent = descent;
        *height += line.height;
        lines.push(line);
    }
}

fn paragraph_chars<'a>(document: &'a Document, paragraph: &ScriptParagraph) -> &'a [char] {
    &document.chars()[paragraph.char_index..paragraph.char_index + paragraph.char_count]
}

/// Steps through one run a character at a time, following its glyph
/// clusters in storage order
struct CharWalker {
    run_index: usize,
    /// Run-relative; may step one past either end
    glyph: isize,
}

impl CharWalker {
    fn new(paragraph: &ScriptParagraph, run_index: usize, first_char: usize) -> Self {
        Self {
            run_index,
            glyph: paragraph.logical_clusters[first_char] as isize,
        }
    }

    /// Add the advance of `char_offset` to `x`. Tabs are widened to the
    /// next stop when `expand_tabs` is set.
    fn advance(
        &mut self,
        paragraph: &mut ScriptParagraph,
        chars: &[char],
        char_offset: usize,
        x: i32,
        ruler: &TabStopRuler,
        expand_tabs: bool,
    ) -> i32 {
        let run = &paragraph.runs[self.run_index];
        if run.kind == RunKind::Object {
            return x + run.abc.total();
        }
        let base = run.glyph_index_in_paragraph;
        let glyph_count = run.glyph_count as isize;
        let run_end = run.char_end_in_paragraph();
        let rtl = run.is_right_to_left();
        if glyph_count == 0 {
            return x;
        }

        if expand_tabs && chars[char_offset] == '\t' {
            if !(0..glyph_count).contains(&self.glyph) {
                return x;
            }
            let tabbed = ruler.advance_to_next_tab_stop(x);
            let slot = base + self.glyph as usize;
            let previous = paragraph.glyph_advances[slot];
            paragraph.glyph_advances[slot] = tabbed - x;
            paragraph.runs[self.run_index].abc.b += tabbed - x - previous;
            self.glyph += if rtl { -1 } else { 1 };
            return tabbed;
        }

        let next_char = char_offset + 1;
        let mut x = x;
        if rtl {
            let next_glyph = if next_char < run_end {
                paragraph.logical_clusters[next_char] as isize
            } else {
                -1
            };
            while self.glyph > next_glyph {
                x += paragraph.glyph_advances[base + self.glyph as usize];
                self.glyph -= 1;
            }
        } else {
            let next_glyph = if next_char < run_end {
                paragraph.logical_clusters[next_char] as isize
            } else {
                glyph_count
            };
            while self.glyph < next_glyph {
                x += paragraph.glyph_advances[base + self.glyph as usize];
                self.glyph += 1;
            }
        }
        x
    }
}
