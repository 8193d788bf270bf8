//! Append-only document model: characters, paragraphs and runs

mod annotation;
mod lookup_table;
mod object;
mod paragraph;
mod style;

pub use annotation::AnnotationTable;
pub use lookup_table::{Interned, LookupTable};
pub use object::{
    BoxError, EmbeddedObject, EmbeddedObjectClient, EmbeddedObjectMeasurements,
    EmbeddedObjectSite, FixedSizeObject, ObjectRef,
};
pub use paragraph::{Paragraph, Run, RunKind};
pub use style::{Color, FontDescriptor, Style, StyleBuilder, TabStopRuler};

use crate::error::{LayoutError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Character standing in for an embedded object
pub const OBJECT_PLACEHOLDER: char = '\u{FFFC}';

const INITIAL_CHAR_CAPACITY: usize = 4096;
const INITIAL_PARAGRAPH_CAPACITY: usize = 64;
const INITIAL_RUN_CAPACITY: usize = 128;

/// Capacity limits of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentConfig {
    /// Distinct styles, at most 256
    pub max_styles: usize,
    /// Distinct embedded objects, at most 65535
    pub max_objects: usize,
    /// Characters per text run before a continuation run starts, at most 65535
    pub max_chars_per_run: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            max_styles: 256,
            max_objects: 65535,
            max_chars_per_run: 65535,
        }
    }
}

impl DocumentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=256).contains(&self.max_styles) {
            return Err(LayoutError::InvalidConfig(format!(
                "max_styles must be within 1..=256, got {}",
                self.max_styles
            )));
        }
        if self.max_objects > 65535 {
            return Err(LayoutError::InvalidConfig(format!(
                "max_objects must be at most 65535, got {}",
                self.max_objects
            )));
        }
        if !(1..=65535).contains(&self.max_chars_per_run) {
            return Err(LayoutError::InvalidConfig(format!(
                "max_chars_per_run must be within 1..=65535, got {}",
                self.max_chars_per_run
            )));
        }
        Ok(())
    }
}

/// What an append did to the document, consumed by the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentChange {
    /// The paragraph at this index and everything after it changed
    ParagraphChanged(usize),
    /// All content was removed
    Cleared,
}

/// The main document structure
#[derive(Debug)]
pub struct Document {
    config: DocumentConfig,
    chars: Vec<char>,
    paragraphs: Vec<Paragraph>,
    runs: Vec<Run>,
    styles: LookupTable<Style>,
    objects: LookupTable<ObjectRef>,
    /// Interned style indices; the bottom entry is the default style
    style_stack: Vec<usize>,
    annotations: FxHashMap<String, AnnotationTable>,
    /// Monotonic version counter
    version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a new empty document with default limits
    pub fn new() -> Self {
        Self::build(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Create a document from plain text in the default style
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.append_text_indexed(0, text);
        doc
    }

    fn build(config: DocumentConfig) -> Self {
        let mut doc = Self {
            config,
            chars: Vec::with_capacity(INITIAL_CHAR_CAPACITY),
            paragraphs: Vec::with_capacity(INITIAL_PARAGRAPH_CAPACITY),
            runs: Vec::with_capacity(INITIAL_RUN_CAPACITY),
            styles: LookupTable::for_styles(config.max_styles),
            objects: LookupTable::for_objects(config.max_objects),
            style_stack: Vec::new(),
            annotations: FxHashMap::default(),
            version: 0,
        };
        doc.reset();
        doc
    }

    fn reset(&mut self) {
        self.chars.clear();
        self.paragraphs.clear();
        self.runs.clear();
        self.styles.clear();
        self.objects.clear();
        self.annotations.clear();
        self.style_stack.clear();

        // An empty table always has room for the default style
        let default_index = self.styles.assign_index(&Style::default()).unwrap_or(0);
        self.style_stack.push(default_index);
        self.paragraphs.push(Paragraph::new(0, 0));
    }

    /// Remove all content, styles, objects and annotations
    pub fn clear(&mut self) -> DocumentChange {
        self.reset();
        self.version += 1;
        DocumentChange::Cleared
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Get document version
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }

    /// Runs belonging to a paragraph
    pub fn paragraph_runs(&self, paragraph: &Paragraph) -> &[Run] {
        &self.runs[paragraph.run_index()..paragraph.run_index() + paragraph.run_count()]
    }

    pub fn paragraph_chars(&self, paragraph: &Paragraph) -> &[char] {
        &self.chars[paragraph.char_index()..paragraph.char_end()]
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Style by interned index
    pub fn style(&self, index: usize) -> &Style {
        match self.styles.get(index) {
            Some(style) => style,
            None => panic!("style index {} was never interned", index),
        }
    }

    pub fn object(&self, index: usize) -> &ObjectRef {
        match self.objects.get(index) {
            Some(object) => object,
            None => panic!("object index {} was never interned", index),
        }
    }

    /// Paragraph containing the character at `char_index`
    pub fn paragraph_at_char(&self, char_index: usize) -> Option<usize> {
        if char_index >= self.chars.len() {
            return None;
        }
        let after = self
            .paragraphs
            .partition_point(|p| p.char_index() <= char_index);
        Some(after - 1)
    }

    /// Run containing `char_index`, with the run's first character index
    pub fn run_at_char(&self, char_index: usize) -> Result<(&Run, usize)> {
        let paragraph_index =
            self.paragraph_at_char(char_index)
                .ok_or(LayoutError::CharIndexOutOfBounds {
                    index: char_index,
                    char_count: self.chars.len(),
                })?;
        let paragraph = &self.paragraphs[paragraph_index];
        let mut run_start = paragraph.char_index();
        for run in self.paragraph_runs(paragraph) {
            let run_end = run_start + run.char_count();
            if char_index < run_end {
                return Ok((run, run_start));
            }
            run_start = run_end;
        }
        panic!(
            "paragraph {} runs do not cover char {}",
            paragraph_index, char_index
        );
    }

    pub fn style_at(&self, char_index: usize) -> Result<&Style> {
        let (run, _) = self.run_at_char(char_index)?;
        Ok(self.style(run.style_index()))
    }

    /// Embedded object at `char_index`, if that character is a placeholder
    pub fn object_at(&self, char_index: usize) -> Result<Option<&ObjectRef>> {
        let (run, _) = self.run_at_char(char_index)?;
        Ok(run.object_index().map(|index| self.object(index)))
    }

    pub fn text_range(&self, start: usize, length: usize) -> Result<String> {
        let end = start.checked_add(length).filter(|&end| end <= self.chars.len());
        match end {
            Some(end) => Ok(self.chars[start..end].iter().collect()),
            None => Err(LayoutError::CharRangeOutOfBounds {
                start,
                length,
                char_count: self.chars.len(),
            }),
        }
    }

    pub fn current_style(&self) -> &Style {
        let top = self.style_stack.last().copied().unwrap_or(0);
        self.style(top)
    }

    pub fn begin_style(&mut self, style: &Style) -> Result<()> {
        let index = self.styles.assign_index(style)?;
        self.style_stack.push(index);
        Ok(())
    }

    pub fn end_style(&mut self) -> Result<()> {
        if self.style_stack.len() <= 1 {
            return Err(LayoutError::StyleStackUnderflow);
        }
        self.style_stack.pop();
        Ok(())
    }

    pub fn begin_annotation(&mut self, key: &str, value: impl Into<String>) {
        let char_index = self.chars.len();
        self.annotations
            .entry(key.to_string())
            .or_default()
            .begin(char_index, value.into());
    }

    pub fn end_annotation(&mut self, key: &str) -> Result<()> {
        let char_index = self.chars.len();
        let ended = self
            .annotations
            .get_mut(key)
            .map_or(false, |table| table.end(char_index));
        if ended {
            Ok(())
        } else {
            Err(LayoutError::NoCurrentAnnotation(key.to_string()))
        }
    }

    pub fn current_annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).and_then(AnnotationTable::current)
    }

    pub fn annotation_at(&self, key: &str, char_index: usize) -> Option<&str> {
        if char_index >= self.chars.len() {
            return None;
        }
        self.annotations
            .get(key)
            .and_then(|table| table.value_at(char_index))
    }

    /// Append text; `\n` closes the current paragraph, `\t` is kept for
    /// expansion at layout time and other control characters are dropped.
    ///
    /// Returns `None` when nothing was appended.
    pub fn append_text(&mut self, style: &Style, text: &str) -> Result<Option<DocumentChange>> {
        if !text.chars().any(|ch| !ch.is_control() || ch == '\n' || ch == '\t') {
            return Ok(None);
        }
        let style_index = self.styles.assign_index(style)?;
        Ok(self.append_text_indexed(style_index, text))
    }

    /// Append text in the style on top of the style stack
    pub fn append_text_current(&mut self, text: &str) -> Option<DocumentChange> {
        let style_index = self.style_stack.last().copied().unwrap_or(0);
        self.append_text_indexed(style_index, text)
    }

    /// Close the current paragraph and open a new one
    pub fn append_line(&mut self, style: &Style) -> Result<DocumentChange> {
        let style_index = self.styles.assign_index(style)?;
        let changed = self.current_paragraph_index();
        self.append_text_indexed(style_index, "\n");
        Ok(DocumentChange::ParagraphChanged(changed))
    }

    pub fn append_object(&mut self, style: &Style, object: ObjectRef) -> Result<DocumentChange> {
        self.styles.check_room(style)?;
        self.objects.check_room(&object)?;
        let style_index = self.styles.assign_index(style)?;
        let object_index = self.objects.assign_index(&object)?;

        let changed = self.current_paragraph_index();
        self.chars.push(OBJECT_PLACEHOLDER);
        self.push_run(Run::object(style_index, object_index));
        self.current_paragraph_mut().add_chars(1);
        self.version += 1;
        Ok(DocumentChange::ParagraphChanged(changed))
    }

    fn append_text_indexed(&mut self, style_index: usize, text: &str) -> Option<DocumentChange> {
        let changed = self.current_paragraph_index();
        let chars_before = self.chars.len();
        let paragraphs_before = self.paragraphs.len();

        let mut segment_start = 0;
        for (i, ch) in text.char_indices() {
            if !ch.is_control() {
                continue;
            }
            self.append_plain(style_index, &text[segment_start..i]);
            segment_start = i + ch.len_utf8();
            match ch {
                '\n' => {
                    self.append_plain(style_index, "\n");
                    self.start_paragraph();
                }
                '\t' => self.append_tab(style_index),
                _ => {}
            }
        }
        self.append_plain(style_index, &text[segment_start..]);

        if self.chars.len() == chars_before && self.paragraphs.len() == paragraphs_before {
            return None;
        }
        self.version += 1;
        Some(DocumentChange::ParagraphChanged(changed))
    }

    fn append_plain(&mut self, style_index: usize, text: &str) {
        let mut remaining = 0;
        for ch in text.chars() {
            self.chars.push(ch);
            remaining += 1;
        }
        if remaining == 0 {
            return;
        }

        let max = self.config.max_chars_per_run;
        let mut run_index = self.ensure_text_run(style_index);
        loop {
            let room = max - self.runs[run_index].char_count();
            let taken = remaining.min(room);
            self.runs[run_index].add_chars(taken);
            self.current_paragraph_mut().add_chars(taken);
            remaining -= taken;
            if remaining == 0 {
                break;
            }
            run_index = self.push_run(Run::text(style_index));
        }
    }

    fn append_tab(&mut self, style_index: usize) {
        self.chars.push('\t');
        let max = self.config.max_chars_per_run;
        let run_index = match self.last_run_in_paragraph() {
            Some(index)
                if self.runs[index].requires_tab_expansion()
                    && self.runs[index].style_index() == style_index
                    && self.runs[index].char_count() < max =>
            {
                index
            }
            _ => self.push_run(Run::tab(style_index)),
        };
        self.runs[run_index].add_chars(1);
        self.current_paragraph_mut().add_chars(1);
    }

    /// Index of a text run accepting more characters of `style_index`
    fn ensure_text_run(&mut self, style_index: usize) -> usize {
        match self.last_run_in_paragraph() {
            Some(index)
                if self.runs[index].kind() == RunKind::Text
                    && !self.runs[index].requires_tab_expansion()
                    && self.runs[index].style_index() == style_index
                    && self.runs[index].char_count() < self.config.max_chars_per_run =>
            {
                index
            }
            _ => self.push_run(Run::text(style_index)),
        }
    }

    fn last_run_in_paragraph(&self) -> Option<usize> {
        let paragraph = self.paragraphs.last()?;
        (paragraph.run_count() > 0).then(|| self.runs.len() - 1)
    }

    fn push_run(&mut self, run: Run) -> usize {
        self.runs.push(run);
        self.current_paragraph_mut().add_run();
        self.runs.len() - 1
    }

    fn start_paragraph(&mut self) {
        self.paragraphs
            .push(Paragraph::new(self.chars.len(), self.runs.len()));
    }

    fn current_paragraph_index(&self) -> usize {
        self.paragraphs.len() - 1
    }

    fn current_paragraph_mut(&mut self) -> &mut Paragraph {
        let index = self.current_paragraph_index();
        &mut self.paragraphs[index]
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.chars {
            fmt::Write::write_char(f, *ch)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(n: u8) -> Style {
        Style::builder().color(Color::rgb(n, 0, 0)).build()
    }

    fn assert_partitioned(doc: &Document) {
        let mut expected_char = 0;
        let mut expected_run = 0;
        for paragraph in doc.paragraphs() {
            assert_eq!(paragraph.char_index(), expected_char);
            assert_eq!(paragraph.run_index(), expected_run);
            let run_chars: usize = doc
                .paragraph_runs(paragraph)
                .iter()
                .map(Run::char_count)
                .sum();
            assert_eq!(run_chars, paragraph.char_count());
            expected_char += paragraph.char_count();
            expected_run += paragraph.run_count();
        }
        assert_eq!(expected_char, doc.char_count());
        assert_eq!(expected_run, doc.run_count());
    }

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert_eq!(doc.char_count(), 0);
        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.run_count(), 0);
        assert_eq!(doc.style_count(), 1);
        assert_eq!(doc.current_style(), &Style::default());
        assert_eq!(doc.to_string(), "");
    }

    #[test]
    fn test_append_mixed_content() {
        let mut doc = Document::new();
        let object = ObjectRef::new(FixedSizeObject::new(8, 8));
        let mut changes = Vec::new();

        changes.push(doc.append_text(&styled(1), "Some text, ").unwrap());
        changes.push(doc.append_text(&styled(1), "lalala.\n").unwrap());
        changes.push(doc.append_text(&styled(2), "More text.").unwrap());
        changes.push(doc.append_text(&styled(2), "Tab\t.\n").unwrap());
        changes.push(Some(doc.append_line(&styled(3)).unwrap()));
        changes.push(doc.append_text(&styled(1), "(").unwrap());
        changes.push(Some(doc.append_object(&styled(1), object.clone()).unwrap()));
        changes.push(doc.append_text(&styled(2), ")").unwrap());

        let changed: Vec<_> = changes
            .into_iter()
            .map(|c| match c {
                Some(DocumentChange::ParagraphChanged(i)) => i,
                other => panic!("unexpected change {:?}", other),
            })
            .collect();
        assert_eq!(changed, vec![0, 0, 1, 1, 2, 3, 3, 3]);

        assert_eq!(
            doc.to_string(),
            "Some text, lalala.\nMore text.Tab\t.\n\n(\u{FFFC})"
        );
        assert_eq!(doc.paragraph_count(), 4);
        let counts: Vec<_> = doc
            .paragraphs()
            .iter()
            .map(|p| (p.char_count(), p.run_count()))
            .collect();
        assert_eq!(counts, vec![(19, 1), (16, 3), (1, 1), (3, 3)]);
        assert_eq!(doc.run_count(), 8);
        assert_partitioned(&doc);

        // "More text.Tab" | "\t" | ".\n"
        let second = doc.paragraph(1).unwrap();
        let runs = doc.paragraph_runs(second);
        assert_eq!(runs[0].char_count(), 13);
        assert!(runs[1].requires_tab_expansion());
        assert_eq!(runs[1].char_count(), 1);
        assert_eq!(runs[2].char_count(), 2);

        assert_eq!(doc.style_at(0).unwrap(), &styled(1));
        assert_eq!(doc.style_at(35).unwrap(), &styled(3));
        assert!(doc.object_at(36).unwrap().is_none());
        assert!(doc.object_at(37).unwrap().unwrap().ptr_eq(&object));
        assert_eq!(doc.style_at(38).unwrap(), &styled(2));
        assert!(matches!(
            doc.style_at(39),
            Err(LayoutError::CharIndexOutOfBounds { index: 39, .. })
        ));
    }

    #[test]
    fn test_control_characters_dropped() {
        let mut doc = Document::new();
        let change = doc.append_text(&Style::default(), "a\r\u{7}b").unwrap();
        assert_eq!(change, Some(DocumentChange::ParagraphChanged(0)));
        assert_eq!(doc.to_string(), "ab");
        assert_eq!(doc.run_count(), 1);

        assert_eq!(doc.append_text(&Style::default(), "").unwrap(), None);
        assert_eq!(doc.append_text(&Style::default(), "\r").unwrap(), None);
    }

    #[test]
    fn test_consecutive_tabs_share_run() {
        let mut doc = Document::new();
        doc.append_text(&Style::default(), "a\t\tb").unwrap();
        let runs = doc.paragraph_runs(doc.paragraph(0).unwrap());
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[1].char_count(), 2);
        assert!(runs[1].requires_tab_expansion());
        assert!(!runs[2].requires_tab_expansion());
    }

    #[test]
    fn test_long_runs_split() {
        let config = DocumentConfig {
            max_chars_per_run: 4,
            ..DocumentConfig::default()
        };
        let mut doc = Document::with_config(config).unwrap();
        doc.append_text(&Style::default(), "abcdefghij").unwrap();
        let runs = doc.paragraph_runs(doc.paragraph(0).unwrap());
        let counts: Vec<_> = runs.iter().map(Run::char_count).collect();
        assert_eq!(counts, vec![4, 4, 2]);
        assert!(runs.iter().all(|r| r.style_index() == 0));
        assert_partitioned(&doc);
    }

    #[test]
    fn test_style_capacity_rejects_before_mutation() {
        let config = DocumentConfig {
            max_styles: 2,
            ..DocumentConfig::default()
        };
        let mut doc = Document::with_config(config).unwrap();
        doc.append_text(&styled(1), "x").unwrap();
        let err = doc.append_text(&styled(2), "y").unwrap_err();
        assert!(matches!(err, LayoutError::TooManyStyles { max: 2 }));
        assert_eq!(doc.to_string(), "x");
        assert_eq!(doc.style_count(), 2);
    }

    #[test]
    fn test_object_capacity_rejects_before_interning_style() {
        let config = DocumentConfig {
            max_objects: 1,
            ..DocumentConfig::default()
        };
        let mut doc = Document::with_config(config).unwrap();
        doc.append_object(&Style::default(), ObjectRef::new(FixedSizeObject::new(4, 4)))
            .unwrap();
        let version = doc.version();

        let err = doc
            .append_object(&styled(1), ObjectRef::new(FixedSizeObject::new(4, 4)))
            .unwrap_err();
        assert!(matches!(err, LayoutError::TooManyObjects { max: 1 }));
        assert_eq!(doc.style_count(), 1);
        assert_eq!(doc.object_count(), 1);
        assert_eq!(doc.char_count(), 1);
        assert_eq!(doc.version(), version);
    }

    #[test]
    fn test_control_only_text_interns_nothing() {
        let mut doc = Document::new();
        let styles = doc.style_count();
        assert!(doc.append_text(&styled(3), "\r\u{7}").unwrap().is_none());
        assert_eq!(doc.style_count(), styles);
        assert_eq!(doc.char_count(), 0);
    }

    #[test]
    fn test_style_stack() {
        let mut doc = Document::new();
        assert!(matches!(doc.end_style(), Err(LayoutError::StyleStackUnderflow)));

        doc.begin_style(&styled(9)).unwrap();
        doc.append_text_current("red");
        doc.end_style().unwrap();
        doc.append_text_current("plain");

        assert_eq!(doc.style_at(0).unwrap(), &styled(9));
        assert_eq!(doc.style_at(3).unwrap(), &Style::default());
        assert_eq!(doc.run_count(), 2);
    }

    #[test]
    fn test_annotations() {
        let mut doc = Document::new();
        doc.append_text_current("see ");
        doc.begin_annotation("href", "https://example.com");
        assert_eq!(doc.current_annotation("href"), Some("https://example.com"));
        doc.append_text_current("here");
        doc.end_annotation("href").unwrap();
        doc.append_text_current(".");

        assert_eq!(doc.annotation_at("href", 3), None);
        assert_eq!(doc.annotation_at("href", 4), Some("https://example.com"));
        assert_eq!(doc.annotation_at("href", 7), Some("https://example.com"));
        assert_eq!(doc.annotation_at("href", 8), None);
        assert_eq!(doc.annotation_at("other", 5), None);
        assert!(matches!(
            doc.end_annotation("href"),
            Err(LayoutError::NoCurrentAnnotation(_))
        ));
    }

    #[test]
    fn test_text_range() {
        let doc = Document::from_text("Hello\nWorld");
        assert_eq!(doc.text_range(6, 5).unwrap(), "World");
        assert_eq!(doc.text_range(11, 0).unwrap(), "");
        assert!(doc.text_range(7, 5).is_err());
        assert!(doc.text_range(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_paragraph_at_char() {
        let doc = Document::from_text("ab\ncd\n");
        assert_eq!(doc.paragraph_count(), 3);
        assert_eq!(doc.paragraph_at_char(0), Some(0));
        assert_eq!(doc.paragraph_at_char(2), Some(0));
        assert_eq!(doc.paragraph_at_char(3), Some(1));
        assert_eq!(doc.paragraph_at_char(5), Some(1));
        assert_eq!(doc.paragraph_at_char(6), None);
        // Trailing sentinel paragraph
        assert_eq!(doc.paragraph(2).unwrap().run_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut doc = Document::from_text("abc\ndef");
        let version = doc.version();
        assert_eq!(doc.clear(), DocumentChange::Cleared);
        assert!(doc.version() > version);
        assert_eq!(doc.char_count(), 0);
        assert_eq!(doc.paragraph_count(), 1);
        assert_eq!(doc.style_count(), 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(DocumentConfig::from_json(r#"{"maxStyles": 300}"#).is_err());
        let config = DocumentConfig::from_json(r#"{"maxObjects": 10}"#).unwrap();
        assert_eq!(config.max_objects, 10);
        assert_eq!(config.max_styles, 256);
    }
}
