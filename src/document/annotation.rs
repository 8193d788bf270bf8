//! Keyed annotations recorded as change points over character indices

/// Values of one annotation key across the document.
///
/// Values nest: ending an annotation restores the one that was open before
/// it. Lookups by character index see the innermost value at that point.
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    /// (first char index, value) change points, ascending
    changes: Vec<(usize, Option<String>)>,
    open: Vec<String>,
}

impl AnnotationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, char_index: usize, value: String) {
        self.open.push(value.clone());
        self.set_from(char_index, Some(value));
    }

    /// Close the innermost value; false if nothing is open
    pub fn end(&mut self, char_index: usize) -> bool {
        if self.open.pop().is_none() {
            return false;
        }
        let restored = self.open.last().cloned();
        self.set_from(char_index, restored);
        true
    }

    pub fn current(&self) -> Option<&str> {
        self.open.last().map(String::as_str)
    }

    pub fn value_at(&self, char_index: usize) -> Option<&str> {
        let pos = self.changes.partition_point(|(start, _)| *start <= char_index);
        if pos == 0 {
            return None;
        }
        self.changes[pos - 1].1.as_deref()
    }

    fn set_from(&mut self, char_index: usize, value: Option<String>) {
        // A change with no characters under it is superseded
        if matches!(self.changes.last(), Some((start, _)) if *start == char_index) {
            self.changes.pop();
        }
        let unchanged = match self.changes.last() {
            Some((_, previous)) => *previous == value,
            None => value.is_none(),
        };
        if !unchanged {
            self.changes.push((char_index, value));
        }
    }
}
