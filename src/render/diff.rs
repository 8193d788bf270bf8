//! What a layout pass changed, for partial repaints

use crate::Rect;

/// Summary of one [`Layout::update`](crate::Layout::update) pass.
///
/// Everything above `dirty_top` is unchanged; the area from `dirty_top` to
/// the larger of the old and new heights must be repainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutDiff {
    /// First paragraph whose lines were rebuilt, `None` if nothing was
    pub first_paragraph: Option<usize>,
    /// Index of the first rebuilt line
    pub first_line: usize,
    pub dirty_top: i32,
    pub previous_height: i32,
    pub height: i32,
}

impl LayoutDiff {
    /// A pass that rebuilt nothing
    pub fn unchanged(height: i32) -> Self {
        Self {
            first_paragraph: None,
            first_line: 0,
            dirty_top: height,
            previous_height: height,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_paragraph.is_none()
    }

    pub fn height_changed(&self) -> bool {
        self.previous_height != self.height
    }

    /// Area to repaint, in layout coordinates, for a layout `width` wide
    pub fn dirty_rect(&self, width: i32) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let bottom = self.previous_height.max(self.height);
        Some(Rect::new(0, self.dirty_top, width, bottom - self.dirty_top))
    }

    /// Fold a later pass into this one
    pub fn merge(&mut self, later: &LayoutDiff) {
        if later.is_empty() {
            self.height = later.height;
            return;
        }
        if self.is_empty() {
            *self = LayoutDiff {
                previous_height: self.previous_height,
                ..*later
            };
            return;
        }
        self.first_paragraph = self.first_paragraph.min(later.first_paragraph);
        self.first_line = self.first_line.min(later.first_line);
        self.dirty_top = self.dirty_top.min(later.dirty_top);
        self.height = later.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relaid(paragraph: usize, line: usize, top: i32, previous: i32, height: i32) -> LayoutDiff {
        LayoutDiff {
            first_paragraph: Some(paragraph),
            first_line: line,
            dirty_top: top,
            previous_height: previous,
            height,
        }
    }

    #[test]
    fn test_unchanged_has_no_dirty_area() {
        let diff = LayoutDiff::unchanged(120);
        assert!(diff.is_empty());
        assert!(!diff.height_changed());
        assert_eq!(diff.dirty_rect(400), None);
    }

    #[test]
    fn test_dirty_rect_covers_shrunk_area() {
        let diff = relaid(3, 7, 112, 200, 160);
        assert!(diff.height_changed());
        assert_eq!(diff.dirty_rect(400), Some(Rect::new(0, 112, 400, 88)));
    }

    #[test]
    fn test_merge_keeps_earliest_change() {
        let mut diff = LayoutDiff::unchanged(100);
        diff.merge(&relaid(4, 6, 96, 100, 116));
        diff.merge(&relaid(2, 3, 48, 116, 132));
        diff.merge(&LayoutDiff::unchanged(132));
        assert_eq!(diff, relaid(2, 3, 48, 100, 132));
    }
}
