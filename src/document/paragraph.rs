//! Compact paragraph and run descriptors

use std::fmt;

/// Range of characters and runs forming one paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paragraph {
    char_index: u32,
    char_count: u32,
    run_index: u32,
    run_count: u32,
}

impl Paragraph {
    pub(crate) fn new(char_index: usize, run_index: usize) -> Self {
        Self {
            char_index: char_index as u32,
            char_count: 0,
            run_index: run_index as u32,
            run_count: 0,
        }
    }

    pub fn char_index(&self) -> usize {
        self.char_index as usize
    }

    pub fn char_count(&self) -> usize {
        self.char_count as usize
    }

    pub fn run_index(&self) -> usize {
        self.run_index as usize
    }

    pub fn run_count(&self) -> usize {
        self.run_count as usize
    }

    /// One past the last character
    pub fn char_end(&self) -> usize {
        self.char_index() + self.char_count()
    }

    pub(crate) fn add_chars(&mut self, count: usize) {
        self.char_count += count as u32;
    }

    pub(crate) fn add_run(&mut self) {
        self.run_count += 1;
    }
}

/// What a run contains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Text,
    Object,
}

const FLAG_OBJECT: u8 = 0b01;
const FLAG_TAB: u8 = 0b10;

/// A span of one style and one kind, packed into four bytes.
///
/// `misc` holds the character count for text runs and the object index for
/// object runs, which always cover exactly one placeholder character.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Run {
    style_index: u8,
    flags: u8,
    misc: u16,
}

impl Run {
    pub(crate) fn text(style_index: usize) -> Self {
        Self {
            style_index: style_index as u8,
            flags: 0,
            misc: 0,
        }
    }

    pub(crate) fn tab(style_index: usize) -> Self {
        Self {
            flags: FLAG_TAB,
            ..Self::text(style_index)
        }
    }

    pub(crate) fn object(style_index: usize, object_index: usize) -> Self {
        Self {
            style_index: style_index as u8,
            flags: FLAG_OBJECT,
            misc: object_index as u16,
        }
    }

    pub fn kind(&self) -> RunKind {
        if self.flags & FLAG_OBJECT != 0 {
            RunKind::Object
        } else {
            RunKind::Text
        }
    }

    pub fn style_index(&self) -> usize {
        self.style_index as usize
    }

    /// Whether the run holds tab characters whose width depends on position
    pub fn requires_tab_expansion(&self) -> bool {
        self.flags & FLAG_TAB != 0
    }

    pub fn char_count(&self) -> usize {
        match self.kind() {
            RunKind::Text => self.misc as usize,
            RunKind::Object => 1,
        }
    }

    pub fn object_index(&self) -> Option<usize> {
        match self.kind() {
            RunKind::Object => Some(self.misc as usize),
            RunKind::Text => None,
        }
    }

    pub(crate) fn add_chars(&mut self, count: usize) {
        debug_assert_eq!(self.kind(), RunKind::Text);
        debug_assert!(self.misc as usize + count <= u16::MAX as usize);
        self.misc += count as u16;
    }
}

impl fmt::Debug for Run {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            RunKind::Text => f
                .debug_struct("Run::Text")
                .field("style", &self.style_index)
                .field("chars", &self.misc)
                .field("tab", &self.requires_tab_expansion())
                .finish(),
            RunKind::Object => f
                .debug_struct("Run::Object")
                .field("style", &self.style_index)
                .field("object", &self.misc)
                .finish(),
        }
    }
}
