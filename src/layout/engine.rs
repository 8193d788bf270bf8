//! Incremental layout driver

use crate::document::{Document, DocumentChange, RunKind};
use crate::error::{LayoutError, Result};
use crate::layout::analyzer::ParagraphAnalyzer;
use crate::layout::bidi::{VisualMapper, VisualRun};
use crate::layout::cache::ScriptParagraphCache;
use crate::layout::hit_test::{snap_in_line, SnapKind, SnapPosition};
use crate::layout::line_break::LineBreaker;
use crate::layout::object_host::ObjectHost;
use crate::layout::script::{ScriptLine, ScriptParagraph, ScriptRun};
use crate::layout::shaper::TextShaper;
use crate::layout::signal::LayoutSignal;
use crate::render::LayoutDiff;
use crate::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

/// Layout tuning knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Number of analyzed paragraphs kept in the LRU cache
    pub paragraph_cache_size: usize,
    pub initial_layout_width: i32,
    /// Floor for a line's ascent; also the height of empty lines
    pub minimum_line_height: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            paragraph_cache_size: 64,
            initial_layout_width: 400,
            minimum_line_height: 1,
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.paragraph_cache_size == 0 {
            return Err(LayoutError::InvalidConfig(
                "paragraph_cache_size must be at least 1".into(),
            ));
        }
        if self.initial_layout_width < 1 {
            return Err(LayoutError::InvalidConfig(format!(
                "initial_layout_width must be at least 1, got {}",
                self.initial_layout_width
            )));
        }
        if self.minimum_line_height < 0 {
            return Err(LayoutError::InvalidConfig(format!(
                "minimum_line_height must not be negative, got {}",
                self.minimum_line_height
            )));
        }
        Ok(())
    }
}

/// Caret geometry for a character, in layout coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretPosition {
    pub x: i32,
    pub y: i32,
    pub height: i32,
    /// The character is drawn right-to-left
    pub right_to_left: bool,
}

/// Line table of a document, rebuilt incrementally from invalidation
/// watermarks.
///
/// Paragraphs before the lowest invalidated index keep their lines; the
/// rest are re-analyzed (when their itemization was invalidated) and
/// re-broken on the next [`Layout::update`].
pub struct Layout {
    config: LayoutConfig,
    shaper: Box<dyn TextShaper>,
    analyzer: ParagraphAnalyzer,
    cache: ScriptParagraphCache,
    line_breaker: LineBreaker,
    mapper: VisualMapper,
    objects: ObjectHost,
    signal: LayoutSignal,
    lines: Vec<ScriptLine>,
    desired_layout_width: i32,
    desired_right_to_left: bool,
    current_layout_width: i32,
    current_layout_height: i32,
    current_right_to_left: bool,
    first_invalid_itemization: Option<usize>,
    first_invalid_layout: Option<usize>,
    visual_runs: Vec<VisualRun>,
    clusters: Vec<u32>,
}

impl Layout {
    pub fn new(shaper: Box<dyn TextShaper>) -> Self {
        Self::build(LayoutConfig::default(), shaper)
    }

    pub fn with_config(config: LayoutConfig, shaper: Box<dyn TextShaper>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, shaper))
    }

    fn build(config: LayoutConfig, shaper: Box<dyn TextShaper>) -> Self {
        let signal = LayoutSignal::new();
        signal.set_update_required(true);
        Self {
            config,
            shaper,
            analyzer: ParagraphAnalyzer::new(),
            cache: ScriptParagraphCache::new(config.paragraph_cache_size),
            line_breaker: LineBreaker::new(config.minimum_line_height),
            mapper: VisualMapper::new(),
            objects: ObjectHost::new(),
            signal,
            lines: Vec::new(),
            desired_layout_width: config.initial_layout_width,
            desired_right_to_left: false,
            current_layout_width: config.initial_layout_width,
            current_layout_height: 0,
            current_right_to_left: false,
            first_invalid_itemization: Some(0),
            first_invalid_layout: Some(0),
            visual_runs: Vec::new(),
            clusters: Vec::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Handle for embedded-object clients to request relayout
    pub fn signal(&self) -> &LayoutSignal {
        &self.signal
    }

    pub fn shaper_mut(&mut self) -> &mut dyn TextShaper {
        self.shaper.as_mut()
    }

    pub fn desired_layout_width(&self) -> i32 {
        self.desired_layout_width
    }

    pub fn set_desired_layout_width(&mut self, width: i32) -> Result<()> {
        if width < 1 {
            return Err(LayoutError::InvalidLayoutWidth(width));
        }
        if width != self.desired_layout_width {
            self.desired_layout_width = width;
            self.invalidate_paragraph_layout(0);
        }
        Ok(())
    }

    pub fn desired_right_to_left(&self) -> bool {
        self.desired_right_to_left
    }

    pub fn set_desired_right_to_left(&mut self, right_to_left: bool) {
        if right_to_left != self.desired_right_to_left {
            self.desired_right_to_left = right_to_left;
            self.invalidate_paragraph_itemization(0);
        }
    }

    /// Width the line table was built for
    pub fn current_layout_width(&self) -> i32 {
        self.current_layout_width
    }

    pub fn current_layout_height(&self) -> i32 {
        self.current_layout_height
    }

    pub fn current_right_to_left(&self) -> bool {
        self.current_right_to_left
    }

    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of embedded-object clients currently hosted
    pub fn object_client_count(&self) -> usize {
        self.objects.client_count()
    }

    /// Bounds an embedded object's client was last shown at
    pub fn object_bounds(&self, char_index: usize) -> Option<Rect> {
        self.objects.bounds(char_index)
    }

    /// Apply a document change reported by an append or clear
    pub fn invalidate(&mut self, change: &DocumentChange) {
        match *change {
            DocumentChange::ParagraphChanged(paragraph_index) => {
                self.invalidate_paragraph_itemization(paragraph_index)
            }
            DocumentChange::Cleared => self.reset(),
        }
    }

    /// Discard analysis and lines from `paragraph_index` on
    pub fn invalidate_paragraph_itemization(&mut self, paragraph_index: usize) {
        self.first_invalid_itemization = lower(self.first_invalid_itemization, paragraph_index);
        self.invalidate_paragraph_layout(paragraph_index);
    }

    /// Discard lines from `paragraph_index` on, keeping analysis
    pub fn invalidate_paragraph_layout(&mut self, paragraph_index: usize) {
        self.first_invalid_layout = lower(self.first_invalid_layout, paragraph_index);
        self.signal.set_update_required(true);
    }

    pub fn is_update_required(&self) -> bool {
        self.first_invalid_layout.is_some() || self.signal.is_update_required()
    }

    /// Drop all layout state, hide object clients and schedule a full
    /// layout
    pub fn reset(&mut self) {
        self.cache.clear();
        self.analyzer.reset();
        self.objects.hide_all();
        self.lines = Vec::new();
        self.current_layout_height = 0;
        self.first_invalid_itemization = None;
        self.first_invalid_layout = None;
        self.signal.take_requests();
        self.invalidate_paragraph_itemization(0);
    }

    /// Bring the line table up to date with `document`.
    ///
    /// Runs at most once at a time per layout; requests raised by object
    /// callbacks while it runs are merged afterwards and leave
    /// [`Layout::is_update_required`] set.
    pub fn update(&mut self, document: &Document) -> LayoutDiff {
        let previous_height = self.current_layout_height;
        let Some(guard) = self.signal.enter() else {
            debug!("layout update already running, request queued");
            self.signal.request_update();
            return LayoutDiff::unchanged(previous_height);
        };

        self.merge_signal_requests();
        self.update_itemization();
        let relaid = self.update_layout(document);
        self.objects
            .drain(document, &self.signal, self.current_right_to_left);
        drop(guard);

        self.merge_signal_requests();
        self.signal
            .set_update_required(self.first_invalid_layout.is_some());

        match relaid {
            Some((paragraph, line, dirty_top)) => LayoutDiff {
                first_paragraph: Some(paragraph),
                first_line: line,
                dirty_top,
                previous_height,
                height: self.current_layout_height,
            },
            None => LayoutDiff::unchanged(previous_height),
        }
    }

    fn merge_signal_requests(&mut self) {
        let (itemization, layout) = self.signal.take_requests();
        if let Some(paragraph_index) = itemization {
            self.first_invalid_itemization = lower(self.first_invalid_itemization, paragraph_index);
        }
        if let Some(paragraph_index) = layout {
            self.first_invalid_layout = lower(self.first_invalid_layout, paragraph_index);
        }
    }

    fn update_itemization(&mut self) {
        if let Some(first) = self.first_invalid_itemization.take() {
            self.cache.remove_from(first);
            self.current_right_to_left = self.desired_right_to_left;
        }
    }

    /// Returns the first relaid paragraph, its first line and that line's y
    fn update_layout(&mut self, document: &Document) -> Option<(usize, usize, i32)> {
        let first = self.first_invalid_layout.take()?;
        self.current_layout_width = self.desired_layout_width;

        let (start_paragraph, kept_lines) = match self.first_line_of_paragraph(first) {
            Some(line_index) => (first, line_index),
            // Lines end before `first`: continue after the last laid out paragraph
            None => match self.lines.last() {
                Some(last) if last.paragraph_index < first => {
                    (last.paragraph_index + 1, self.lines.len())
                }
                _ => (0, 0),
            },
        };
        self.lines.truncate(kept_lines);
        self.current_layout_height = self.lines.last().map_or(0, ScriptLine::bottom);
        let dirty_top = self.current_layout_height;

        let paragraph_count = document.paragraph_count();
        for paragraph_index in start_paragraph..paragraph_count {
            let slot = self.analyzed_slot(document, paragraph_index);
            let first_new_line = self.lines.len();
            let paragraph = self.cache.paragraph_mut(slot);
            self.line_breaker.append_lines(
                document,
                paragraph,
                self.current_layout_width,
                self.current_right_to_left,
                &mut self.lines,
                &mut self.current_layout_height,
            );
            self.queue_object_shows(slot, first_new_line);
        }

        debug!(
            start_paragraph,
            paragraph_count,
            kept_lines,
            lines = self.lines.len(),
            height = self.current_layout_height,
            "layout updated"
        );
        Some((start_paragraph, kept_lines, dirty_top))
    }

    /// Cache slot holding the analysis of `paragraph_index`, analyzing it
    /// on a miss
    fn analyzed_slot(&mut self, document: &Document, paragraph_index: usize) -> usize {
        let lookup = self.cache.lookup(paragraph_index);
        if lookup.found {
            return lookup.slot;
        }

        let paragraph = self.cache.paragraph_mut(lookup.slot);
        self.analyzer.analyze(
            document,
            paragraph_index,
            self.shaper.as_mut(),
            self.current_right_to_left,
            &self.signal,
            paragraph,
        );
        self.objects.enqueue_creates(paragraph);

        // Analysis resets tab advances; restore them from existing lines
        let lines = paragraph_lines(&self.lines, paragraph_index);
        if !lines.is_empty() {
            self.line_breaker.reexpand_tabs(
                document,
                paragraph,
                &self.lines[lines],
                self.current_right_to_left,
            );
        }
        lookup.slot
    }

    fn queue_object_shows(&mut self, slot: usize, first_line: usize) {
        let paragraph = self.cache.paragraph(slot);
        if !paragraph.runs.iter().any(|run| run.kind == RunKind::Object) {
            return;
        }
        for line in &self.lines[first_line..] {
            self.mapper.map_line(
                paragraph,
                line,
                self.current_right_to_left,
                self.shaper.as_mut(),
                &mut self.visual_runs,
            );
            for visual in &self.visual_runs {
                let run = &paragraph.runs[visual.run_index];
                if run.kind != RunKind::Object {
                    continue;
                }
                let bounds = object_box(
                    line,
                    visual,
                    run,
                    self.current_layout_width,
                    self.current_right_to_left,
                );
                self.objects
                    .queue_show(paragraph.char_index + run.char_index_in_paragraph, bounds);
            }
        }
    }

    /// Index of the first line of `paragraph_index`
    pub fn first_line_of_paragraph(&self, paragraph_index: usize) -> Option<usize> {
        let range = paragraph_lines(&self.lines, paragraph_index);
        (!range.is_empty()).then_some(range.start)
    }

    /// Index of the last line of `paragraph_index`
    pub fn last_line_of_paragraph(&self, paragraph_index: usize) -> Option<usize> {
        let range = paragraph_lines(&self.lines, paragraph_index);
        (!range.is_empty()).then(|| range.end - 1)
    }

    /// Index of the line containing layout coordinate `y`
    pub fn line_at_y(&self, y: i32) -> Option<usize> {
        let index = self.lines.partition_point(|line| line.bottom() <= y);
        let line = self.lines.get(index)?;
        (line.y <= y).then_some(index)
    }

    /// Analysis of `paragraph_index`, re-analyzing it when it was evicted
    pub fn script_paragraph(&mut self, document: &Document, paragraph_index: usize) -> &ScriptParagraph {
        let slot = self.analyzed_slot(document, paragraph_index);
        self.cache.paragraph(slot)
    }

    /// Call `f` with each line overlapping `top..bottom`, its paragraph
    /// analysis and its runs in visual order.
    ///
    /// Until the next `update()`, lines come from the last completed pass.
    /// Appends only extend paragraphs, so those lines still index valid
    /// runs of a paragraph re-analyzed here, though its last line may then
    /// include characters appended to its last run.
    pub fn visit_lines<F>(&mut self, document: &Document, top: i32, bottom: i32, mut f: F)
    where
        F: FnMut(&ScriptParagraph, &ScriptLine, &[VisualRun]),
    {
        let start = self.lines.partition_point(|line| line.bottom() <= top);
        for line_index in start..self.lines.len() {
            let line = self.lines[line_index];
            if line.y >= bottom {
                break;
            }
            if line.paragraph_index >= document.paragraph_count() {
                break;
            }
            let slot = self.analyzed_slot(document, line.paragraph_index);
            let paragraph = self.cache.paragraph(slot);
            self.mapper.map_line(
                paragraph,
                &line,
                self.current_right_to_left,
                self.shaper.as_mut(),
                &mut self.visual_runs,
            );
            f(paragraph, &line, &self.visual_runs);
        }
    }

    /// Character under `point`, given in the same coordinate space as
    /// `layout_origin`. Answers from the last completed pass, like
    /// [`Layout::visit_lines`].
    pub fn snap_to_char(&mut self, document: &Document, point: Point, layout_origin: Point) -> SnapPosition {
        let char_count = document.char_count();
        if char_count == 0 {
            return SnapPosition::NONE;
        }
        let x = if self.current_right_to_left {
            self.current_layout_width - (point.x - layout_origin.x)
        } else {
            point.x - layout_origin.x
        };
        let y = point.y - layout_origin.y;
        if y < 0 {
            return SnapPosition::new(SnapKind::Leading, 0);
        }

        let trailing = SnapPosition::new(SnapKind::Trailing, char_count - 1);
        let Some(line_index) = self.line_at_y(y) else {
            return trailing;
        };
        let line = self.lines[line_index];
        if line.script_run_count == 0 || line.paragraph_index >= document.paragraph_count() {
            return trailing;
        }

        let slot = self.analyzed_slot(document, line.paragraph_index);
        let paragraph = self.cache.paragraph(slot);
        self.mapper.map_line(
            paragraph,
            &line,
            self.current_right_to_left,
            self.shaper.as_mut(),
            &mut self.visual_runs,
        );
        snap_in_line(
            paragraph,
            &line,
            &self.visual_runs,
            x,
            self.current_right_to_left,
            self.shaper.as_mut(),
            &mut self.clusters,
        )
    }

    /// Caret rectangle at the leading edge of `char_index`
    pub fn char_position(&mut self, document: &Document, char_index: usize) -> Option<CaretPosition> {
        let paragraph_index = document.paragraph_at_char(char_index)?;
        let lines = paragraph_lines(&self.lines, paragraph_index);
        if lines.is_empty() {
            return None;
        }
        let slot = self.analyzed_slot(document, paragraph_index);
        let paragraph = self.cache.paragraph(slot);
        let offset = char_index - paragraph.char_index;

        for line_index in lines {
            let line = self.lines[line_index];
            self.mapper.map_line(
                paragraph,
                &line,
                self.current_right_to_left,
                self.shaper.as_mut(),
                &mut self.visual_runs,
            );
            let Some(visual) = self
                .visual_runs
                .iter()
                .find(|visual| visual.slice.contains_char(offset))
            else {
                continue;
            };
            let run = &paragraph.runs[visual.run_index];
            let before = paragraph.measure_chars(visual.run_index, visual.slice.char_start, offset);
            let from_left = if run.is_right_to_left() {
                visual.width() - before
            } else {
                before
            };
            return Some(CaretPosition {
                x: visual.left(self.current_layout_width, self.current_right_to_left) + from_left,
                y: line.y,
                height: line.height,
                right_to_left: run.is_right_to_left(),
            });
        }
        None
    }
}

fn lower(watermark: Option<usize>, index: usize) -> Option<usize> {
    Some(watermark.map_or(index, |current| current.min(index)))
}

/// Range of line indices belonging to `paragraph_index`
fn paragraph_lines(lines: &[ScriptLine], paragraph_index: usize) -> Range<usize> {
    let start = lines.partition_point(|line| line.paragraph_index < paragraph_index);
    let end = lines.partition_point(|line| line.paragraph_index <= paragraph_index);
    start..end
}

/// Box of an object run's content, without its margins, in layout
/// coordinates
pub(crate) fn object_box(
    line: &ScriptLine,
    visual: &VisualRun,
    run: &ScriptRun,
    layout_width: i32,
    right_to_left: bool,
) -> Rect {
    let leading_margin = if run.is_right_to_left() {
        run.abc.c
    } else {
        run.abc.a
    };
    Rect::new(
        visual.left(layout_width, right_to_left) + leading_margin,
        line.y + line.ascent() - run.ascent(),
        run.abc.b,
        run.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        BoxError, EmbeddedObject, EmbeddedObjectClient, EmbeddedObjectMeasurements,
        EmbeddedObjectSite, FixedSizeObject, ObjectRef, Style,
    };
    use crate::layout::font::FontMetrics;
    use crate::layout::SimpleShaper;
    use crate::Size;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn layout(width: i32) -> Layout {
        let mut layout = Layout::new(Box::new(SimpleShaper::monospace(10, FontMetrics::new(16, 4))));
        layout.set_desired_layout_width(width).unwrap();
        layout
    }

    fn append(document: &mut Document, layout: &mut Layout, text: &str) {
        if let Some(change) = document.append_text(&Style::default(), text).unwrap() {
            layout.invalidate(&change);
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(LayoutConfig::default().validate().is_ok());
        let config = LayoutConfig::from_json(r#"{"paragraphCacheSize": 2}"#).unwrap();
        assert_eq!(config.paragraph_cache_size, 2);
        assert_eq!(config.initial_layout_width, 400);
        assert!(matches!(
            LayoutConfig::from_json(r#"{"paragraphCacheSize": 0}"#),
            Err(LayoutError::InvalidConfig(_))
        ));
        assert!(matches!(
            LayoutConfig::from_json("{"),
            Err(LayoutError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_width_rejected() {
        let mut layout = layout(100);
        assert!(matches!(
            layout.set_desired_layout_width(0),
            Err(LayoutError::InvalidLayoutWidth(0))
        ));
        assert_eq!(layout.desired_layout_width(), 100);
    }

    #[test]
    fn test_empty_document_has_one_line() {
        let document = Document::new();
        let mut layout = layout(100);
        assert!(layout.is_update_required());
        let diff = layout.update(&document);
        assert_eq!(layout.line_count(), 1);
        assert_eq!(layout.current_layout_height(), 1);
        assert_eq!(diff.first_paragraph, Some(0));
        assert!(!layout.is_update_required());
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut document = Document::new();
        let mut layout = layout(60);
        append(&mut document, &mut layout, "aaaa bbbb cccc\nsecond paragraph\n\tend");
        layout.update(&document);
        let first = layout.lines().to_vec();
        let diff = layout.update(&document);
        assert!(diff.is_empty());
        assert_eq!(layout.lines(), &first[..]);
    }

    #[test]
    fn test_append_keeps_earlier_lines() {
        let mut document = Document::new();
        let mut layout = layout(60);
        append(&mut document, &mut layout, "aaaa bbbb\ncccc dddd\neeee");
        layout.update(&document);
        let before = layout.lines().to_vec();
        assert_eq!(before.len(), 5);

        append(&mut document, &mut layout, " ffff");
        let diff = layout.update(&document);
        assert_eq!(diff.first_paragraph, Some(2));
        assert_eq!(diff.first_line, 4);
        assert_eq!(diff.dirty_top, 64);
        assert_eq!(&layout.lines()[..4], &before[..4]);
        assert_eq!(layout.line_count(), 6);
    }

    #[test]
    fn test_width_change_relays_everything() {
        let mut document = Document::new();
        let mut layout = layout(400);
        append(&mut document, &mut layout, "aaaa bbbb cccc");
        layout.update(&document);
        assert_eq!(layout.line_count(), 1);

        layout.set_desired_layout_width(50).unwrap();
        assert_eq!(layout.current_layout_width(), 400);
        let diff = layout.update(&document);
        assert_eq!(layout.current_layout_width(), 50);
        assert_eq!(layout.line_count(), 3);
        assert_eq!(diff.previous_height, 16);
        assert_eq!(diff.height, 48);
    }

    #[test]
    fn test_line_queries() {
        let mut document = Document::new();
        let mut layout = layout(50);
        append(&mut document, &mut layout, "aaaa bbbb\ncc\n");
        layout.update(&document);
        // Paragraph 0 wraps into two lines, then "cc\n", then the empty tail
        assert_eq!(layout.line_count(), 4);
        assert_eq!(layout.first_line_of_paragraph(0), Some(0));
        assert_eq!(layout.last_line_of_paragraph(0), Some(1));
        assert_eq!(layout.first_line_of_paragraph(2), Some(3));
        assert_eq!(layout.first_line_of_paragraph(3), None);
        assert_eq!(layout.line_at_y(0), Some(0));
        assert_eq!(layout.line_at_y(17), Some(1));
        assert_eq!(layout.line_at_y(32), Some(2));
        assert_eq!(layout.line_at_y(-1), None);
        assert_eq!(layout.line_at_y(1000), None);
    }

    #[test]
    fn test_snap_to_char() {
        let mut document = Document::new();
        let mut layout = layout(400);
        let origin = Point::new(0, 0);
        assert_eq!(
            layout.snap_to_char(&document, Point::new(5, 5), origin),
            SnapPosition::NONE
        );

        append(&mut document, &mut layout, "Hello\nworld");
        layout.update(&document);
        let snap = |layout: &mut Layout, x, y| layout.snap_to_char(&document, Point::new(x, y), origin);
        assert_eq!(snap(&mut layout, 12, 4), SnapPosition::new(SnapKind::Exact, 1));
        assert_eq!(snap(&mut layout, 12, 20), SnapPosition::new(SnapKind::Exact, 7));
        assert_eq!(snap(&mut layout, 5, -3), SnapPosition::new(SnapKind::Leading, 0));
        assert_eq!(snap(&mut layout, 300, 4), SnapPosition::new(SnapKind::Trailing, 5));
        assert_eq!(snap(&mut layout, 5, 500), SnapPosition::new(SnapKind::Trailing, 10));
    }

    #[test]
    fn test_snap_honors_origin_and_margin() {
        let style = Style::builder().margins(20, 0).build();
        let mut document = Document::new();
        let mut layout = layout(400);
        layout.invalidate(&document.append_text(&style, "abc").unwrap().unwrap());
        layout.update(&document);
        let origin = Point::new(100, 50);
        assert_eq!(
            layout.snap_to_char(&document, Point::new(105, 55), origin),
            SnapPosition::new(SnapKind::Leading, 0)
        );
        assert_eq!(
            layout.snap_to_char(&document, Point::new(135, 55), origin),
            SnapPosition::new(SnapKind::Exact, 1)
        );
    }

    #[test]
    fn test_snap_right_to_left() {
        let mut document = Document::new();
        let mut layout = layout(100);
        layout.set_desired_right_to_left(true);
        append(&mut document, &mut layout, "\u{5D0}\u{5D1}\u{5D2}");
        layout.update(&document);
        assert!(layout.current_right_to_left());
        let origin = Point::new(0, 0);
        // First character is drawn rightmost
        assert_eq!(
            layout.snap_to_char(&document, Point::new(95, 4), origin),
            SnapPosition::new(SnapKind::Exact, 0)
        );
        assert_eq!(
            layout.snap_to_char(&document, Point::new(75, 4), origin),
            SnapPosition::new(SnapKind::Exact, 2)
        );
        assert_eq!(
            layout.snap_to_char(&document, Point::new(10, 4), origin).kind,
            SnapKind::Trailing
        );
    }

    #[test]
    fn test_char_position() {
        let mut document = Document::new();
        let mut layout = layout(50);
        append(&mut document, &mut layout, "aaaa bbbb");
        layout.update(&document);
        let caret = layout.char_position(&document, 2).unwrap();
        assert_eq!((caret.x, caret.y, caret.height), (20, 0, 16));
        let wrapped = layout.char_position(&document, 6).unwrap();
        assert_eq!((wrapped.x, wrapped.y), (10, 16));
        assert_eq!(layout.char_position(&document, 99), None);
    }

    #[test]
    fn test_cache_miss_reexpands_tabs() {
        let config = LayoutConfig {
            paragraph_cache_size: 1,
            ..LayoutConfig::default()
        };
        let shaper = Box::new(SimpleShaper::monospace(10, FontMetrics::new(16, 4)));
        let mut layout = Layout::with_config(config, shaper).unwrap();
        let mut document = Document::new();
        append(&mut document, &mut layout, "ab\tc\nxyz");
        layout.update(&document);
        let caret_before = layout.char_position(&document, 3).unwrap();
        assert_eq!(caret_before.x, 60);

        // Evict paragraph 0, then query it again
        layout.script_paragraph(&document, 1);
        let caret_after = layout.char_position(&document, 3).unwrap();
        assert_eq!(caret_after, caret_before);
    }

    #[test]
    fn test_queries_before_update_use_previous_lines() {
        let config = LayoutConfig {
            paragraph_cache_size: 1,
            ..LayoutConfig::default()
        };
        let shaper = Box::new(SimpleShaper::monospace(10, FontMetrics::new(16, 4)));
        let mut layout = Layout::with_config(config, shaper).unwrap();
        layout.set_desired_layout_width(100).unwrap();
        let mut document = Document::new();
        append(&mut document, &mut layout, "a\tb\nxy");
        layout.update(&document);
        let lines_before = layout.lines().to_vec();

        // Grow the last paragraph past the width, then evict paragraph 1
        // so the queries below re-analyze it against the old lines
        append(&mut document, &mut layout, "z\tqqqq rrrr ssss");
        layout.script_paragraph(&document, 0);
        assert!(layout.is_update_required());

        let mut visited = Vec::new();
        layout.visit_lines(&document, i32::MIN, i32::MAX, |paragraph, line, runs| {
            let chars: usize = runs.iter().map(|visual| visual.slice.char_count).sum();
            visited.push((paragraph.paragraph_index, line.y, chars));
        });
        // "z" joined the run the old line ends with; the rest is not visited
        assert_eq!(visited, vec![(0, 0, 4), (1, 16, 3)]);
        assert_eq!(
            layout.snap_to_char(&document, Point::new(15, 20), Point::default()),
            SnapPosition::new(SnapKind::Exact, 5)
        );
        assert_eq!(layout.char_position(&document, 5).unwrap().y, 16);
        assert_eq!(layout.lines(), &lines_before[..]);

        layout.update(&document);
        assert!(layout.line_count() > lines_before.len());
        assert_eq!(layout.lines()[0], lines_before[0]);
    }

    #[test]
    fn test_clear_resets_layout() {
        let mut document = Document::new();
        let mut layout = layout(100);
        append(&mut document, &mut layout, "one\ntwo\nthree");
        layout.update(&document);
        assert_eq!(layout.line_count(), 3);

        layout.invalidate(&document.clear());
        layout.update(&document);
        assert_eq!(layout.line_count(), 1);
        assert_eq!(layout.current_layout_height(), 1);
    }

    #[test]
    fn test_nested_update_is_deferred() {
        let mut document = Document::new();
        let mut layout = layout(100);
        append(&mut document, &mut layout, "abc");

        let guard = layout.signal().enter();
        let diff = layout.update(&document);
        assert!(diff.is_empty());
        assert_eq!(layout.line_count(), 0);
        assert_eq!(layout.signal().suppressed_updates(), 1);
        drop(guard);

        assert!(layout.is_update_required());
        layout.update(&document);
        assert_eq!(layout.line_count(), 1);
    }

    struct Recorder {
        shown: Rc<RefCell<Vec<Rect>>>,
        hidden: Rc<Cell<usize>>,
    }

    impl EmbeddedObjectClient for Recorder {
        fn show(&mut self, bounds: Rect, _right_to_left: bool) {
            self.shown.borrow_mut().push(bounds);
        }

        fn hide(&mut self) {
            self.hidden.set(self.hidden.get() + 1);
        }
    }

    /// Object whose client creation asks for another layout pass
    struct Hosted {
        shown: Rc<RefCell<Vec<Rect>>>,
        hidden: Rc<Cell<usize>>,
        nested: Rc<Cell<bool>>,
    }

    impl EmbeddedObject for Hosted {
        fn measure(
            &self,
            _site: &EmbeddedObjectSite<'_>,
        ) -> std::result::Result<EmbeddedObjectMeasurements, BoxError> {
            Ok(EmbeddedObjectMeasurements {
                size: Size::new(20, 10),
                descent: 2,
                ..EmbeddedObjectMeasurements::default()
            })
        }

        fn create_client(
            &self,
            site: &EmbeddedObjectSite<'_>,
        ) -> Option<Box<dyn EmbeddedObjectClient>> {
            self.nested.set(site.signal.is_updating());
            site.signal.invalidate_paragraph_layout(0);
            Some(Box::new(Recorder {
                shown: Rc::clone(&self.shown),
                hidden: Rc::clone(&self.hidden),
            }))
        }
    }

    #[test]
    fn test_object_clients_created_after_lines() {
        let shown = Rc::new(RefCell::new(Vec::new()));
        let hidden = Rc::new(Cell::new(0));
        let nested = Rc::new(Cell::new(false));
        let object = ObjectRef::new(Hosted {
            shown: Rc::clone(&shown),
            hidden: Rc::clone(&hidden),
            nested: Rc::clone(&nested),
        });

        let mut document = Document::new();
        let mut layout = layout(400);
        append(&mut document, &mut layout, "ab");
        layout.invalidate(&document.append_object(&Style::default(), object).unwrap());
        layout.update(&document);

        assert!(nested.get());
        assert_eq!(layout.object_client_count(), 1);
        // Line ascent is 12 from the text; the object's ascent is 8
        let expected = Rect::new(20, 4, 20, 10);
        assert_eq!(*shown.borrow(), vec![expected]);
        assert_eq!(layout.object_bounds(2), Some(expected));

        // The request made from inside the pass is queued, not run inline
        assert!(layout.is_update_required());
        let diff = layout.update(&document);
        assert_eq!(diff.first_paragraph, Some(0));
        assert_eq!(layout.object_client_count(), 1);
        assert!(!layout.is_update_required());

        layout.reset();
        assert_eq!(hidden.get(), 1);
        assert_eq!(layout.object_client_count(), 0);
    }

    #[test]
    fn test_wide_object_exceeds_margin_on_one_line() {
        let mut document = Document::new();
        let mut layout = layout(100);
        let change = document
            .append_object(&Style::default(), ObjectRef::new(FixedSizeObject::new(250, 30)))
            .unwrap();
        layout.invalidate(&change);
        layout.update(&document);
        assert_eq!(layout.line_count(), 1);
        assert_eq!(layout.lines()[0].height, 30);
        assert_eq!(layout.lines()[0].script_run_count, 1);
    }
}
