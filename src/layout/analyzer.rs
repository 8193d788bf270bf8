//! Paragraph analysis: itemize, break, split into script runs, shape,
//! place and measure embedded objects

use crate::document::{
    Document, EmbeddedObjectMeasurements, EmbeddedObjectSite, Paragraph, Run, RunKind,
};
use crate::layout::font::MetricsCache;
use crate::layout::script::{ScriptParagraph, ScriptRun};
use crate::layout::shaper::{
    Abc, GlyphOffset, GlyphVisualAttr, LogicalAttr, ScriptAnalysis, ScriptItem, ScriptTag,
    ShapeError, ShapedText, TextShaper,
};
use crate::layout::signal::LayoutSignal;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, trace, warn};

/// Reusable scratch state for analyzing paragraphs
#[derive(Default)]
pub struct ParagraphAnalyzer {
    items: Vec<ScriptItem>,
    shaped: ShapedText,
    metrics: MetricsCache,
}

impl ParagraphAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget selected fonts
    pub fn reset(&mut self) {
        self.metrics.clear();
        self.items = Vec::new();
        self.shaped = ShapedText::default();
    }

    /// Fill `out` with the analysis of paragraph `paragraph_index`.
    ///
    /// Paragraphs without runs (the open paragraph of an empty document or
    /// after a trailing newline) produce a paragraph with no runs.
    pub fn analyze(
        &mut self,
        document: &Document,
        paragraph_index: usize,
        shaper: &mut dyn TextShaper,
        right_to_left: bool,
        signal: &LayoutSignal,
        out: &mut ScriptParagraph,
    ) {
        out.clear();
        let Some(paragraph) = document.paragraph(paragraph_index) else {
            return;
        };
        out.paragraph_index = paragraph_index;
        out.char_index = paragraph.char_index();
        out.char_count = paragraph.char_count();

        let runs = document.paragraph_runs(paragraph);
        if runs.is_empty() {
            return;
        }
        debug_assert!(paragraph.char_count() > 0);
        let chars = document.paragraph_chars(paragraph);

        shaper.itemize(chars, right_to_left, &mut self.items);
        assert!(
            self.items.first().map(|item| item.char_index) == Some(0),
            "itemization must start at the first character"
        );

        self.break_items(shaper, chars, out);
        split_script_runs(runs, &self.items, chars.len(), out);
        out.logical_clusters.resize(chars.len(), 0);
        trace!(
            paragraph_index,
            items = self.items.len(),
            script_runs = out.runs.len(),
            "itemized paragraph"
        );

        let paragraph_style_index = out.runs[0].style_index;
        for run_index in 0..out.runs.len() {
            match out.runs[run_index].kind {
                RunKind::Text => self.shape_run(document, shaper, chars, run_index, out),
                RunKind::Object => measure_object_run(
                    document,
                    paragraph,
                    paragraph_style_index,
                    right_to_left,
                    signal,
                    &mut out.runs[run_index],
                    &mut out.logical_attrs,
                ),
            }
        }
    }

    fn break_items(
        &mut self,
        shaper: &mut dyn TextShaper,
        chars: &[char],
        out: &mut ScriptParagraph,
    ) {
        out.logical_attrs.resize(chars.len(), LogicalAttr::default());
        for (i, item) in self.items.iter().enumerate() {
            let end = self
                .items
                .get(i + 1)
                .map_or(chars.len(), |next| next.char_index);
            shaper.break_attributes(
                &chars[item.char_index..end],
                &item.analysis,
                &mut out.logical_attrs[item.char_index..end],
            );
        }
    }

    fn shape_run(
        &mut self,
        document: &Document,
        shaper: &mut dyn TextShaper,
        chars: &[char],
        run_index: usize,
        out: &mut ScriptParagraph,
    ) {
        let (style_index, analysis, start, count, tabs) = {
            let run = &out.runs[run_index];
            (
                run.style_index,
                run.analysis,
                run.char_index_in_paragraph,
                run.char_count,
                run.requires_tab_expansion,
            )
        };
        let font = &document.style(style_index).font;
        let run_chars = &chars[start..start + count];
        let metrics = self.metrics.metrics(font, shaper);

        if let Err(ShapeError::ScriptNotInFont(script)) =
            shaper.shape(font, run_chars, &analysis, &mut self.shaped)
        {
            debug!(%script, "script not in font, shaping without script rules");
            let fallback = ScriptAnalysis {
                script: ScriptTag::UNKNOWN,
                ..analysis
            };
            if let Err(err) = shaper.shape(font, run_chars, &fallback, &mut self.shaped) {
                warn!(%err, "shaping failed, run left without glyphs");
                self.shaped.clear();
            }
        }

        let glyph_index = out.glyphs.len();
        let glyph_count = self.shaped.glyphs.len();
        out.glyphs.extend_from_slice(&self.shaped.glyphs);
        out.glyph_visual_attrs.extend_from_slice(&self.shaped.visual_attrs);
        out.glyph_visual_attrs
            .resize(glyph_index + glyph_count, GlyphVisualAttr::default());
        out.glyph_advances.resize(glyph_index + glyph_count, 0);
        out.glyph_offsets
            .resize(glyph_index + glyph_count, GlyphOffset::default());

        let clusters = &mut out.logical_clusters[start..start + count];
        if self.shaped.logical_clusters.len() == count {
            clusters.copy_from_slice(&self.shaped.logical_clusters);
        } else {
            clusters.fill(0);
        }

        let glyphs = glyph_index..glyph_index + glyph_count;
        let abc = if glyph_count == 0 {
            Abc::default()
        } else {
            shaper.place(
                font,
                &out.glyphs[glyphs.clone()],
                &out.glyph_visual_attrs[glyphs.clone()],
                &analysis,
                &mut out.glyph_advances[glyphs.clone()],
                &mut out.glyph_offsets[glyphs],
            )
        };

        let run = &mut out.runs[run_index];
        run.glyph_index_in_paragraph = glyph_index;
        run.glyph_count = glyph_count;
        run.abc = abc;
        run.height = metrics.height;
        run.descent = metrics.descent;
        run.top_margin = 0;
        run.bottom_margin = 0;

        // Tabs hang like spaces regardless of what the break analysis said
        if tabs {
            for (attr, &c) in out.logical_attrs[start..start + count]
                .iter_mut()
                .zip(run_chars)
            {
                if c == '\t' {
                    attr.insert(LogicalAttr::WHITE_SPACE);
                }
            }
        }
    }
}

/// Intersect document runs with items; every script run lies inside one
/// run and one item
fn split_script_runs(
    runs: &[Run],
    items: &[ScriptItem],
    char_count: usize,
    out: &mut ScriptParagraph,
) {
    out.runs.reserve(runs.len() + items.len());
    let mut run_end = 0;
    let mut item = 0;
    let mut position = 0;
    for run in runs {
        run_end += run.char_count();
        while position < run_end {
            let item_end = items
                .get(item + 1)
                .map_or(char_count, |next| next.char_index);
            let end = run_end.min(item_end);
            out.runs.push(ScriptRun {
                kind: run.kind(),
                style_index: run.style_index(),
                object_index: run.object_index(),
                requires_tab_expansion: run.requires_tab_expansion(),
                analysis: items[item].analysis,
                char_index_in_paragraph: position,
                char_count: end - position,
                glyph_index_in_paragraph: 0,
                glyph_count: 0,
                height: 0,
                descent: 0,
                top_margin: 0,
                bottom_margin: 0,
                abc: Abc::default(),
            });
            position = end;
            if end == item_end {
                item += 1;
            }
        }
    }
    assert!(
        position == char_count && item == items.len(),
        "runs and items disagree on the paragraph length"
    );
}

fn measure_object_run(
    document: &Document,
    paragraph: &Paragraph,
    paragraph_style_index: usize,
    right_to_left: bool,
    signal: &LayoutSignal,
    run: &mut ScriptRun,
    logical_attrs: &mut [LogicalAttr],
) {
    let measurements = match run.object_index {
        Some(object_index) => {
            let site = EmbeddedObjectSite {
                paragraph_style: document.style(paragraph_style_index),
                inline_style: document.style(run.style_index),
                char_index: paragraph.char_index() + run.char_index_in_paragraph,
                right_to_left,
                signal,
            };
            measure_embedded_object(document, object_index, &site)
        }
        None => EmbeddedObjectMeasurements::default(),
    };

    run.glyph_index_in_paragraph = 0;
    run.glyph_count = 0;
    run.height = measurements.size.height;
    run.descent = measurements.descent;
    run.top_margin = measurements.margin.top;
    run.bottom_margin = measurements.margin.bottom;
    run.abc = Abc {
        a: measurements.margin.left,
        b: measurements.size.width,
        c: measurements.margin.right,
    };

    // An object wraps like a word, never like whitespace
    logical_attrs[run.char_index_in_paragraph] = LogicalAttr::from_bits(
        LogicalAttr::SOFT_BREAK | LogicalAttr::CHAR_STOP | LogicalAttr::WORD_STOP,
    );
}

fn measure_embedded_object(
    document: &Document,
    object_index: usize,
    site: &EmbeddedObjectSite<'_>,
) -> EmbeddedObjectMeasurements {
    let object = document.object(object_index);
    match panic::catch_unwind(AssertUnwindSafe(|| object.measure(site))) {
        Ok(Ok(measurements)) => measurements,
        Ok(Err(err)) => {
            warn!(char_index = site.char_index, %err, "embedded object measurement failed");
            EmbeddedObjectMeasurements::default()
        }
        Err(_) => {
            warn!(char_index = site.char_index, "embedded object panicked while measuring");
            EmbeddedObjectMeasurements::default()
        }
    }
}
