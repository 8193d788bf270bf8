//! Fixed-capacity LRU store of analyzed paragraphs

use crate::layout::script::ScriptParagraph;
use tracing::trace;

struct Slot {
    /// `None` once the entry has been dropped by `remove_from`
    paragraph_index: Option<usize>,
    token: u32,
    paragraph: ScriptParagraph,
}

/// Result of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLookup {
    pub found: bool,
    pub slot: usize,
}

/// LRU cache keyed by paragraph index.
///
/// Linear scan over a handful of slots; each use stamps the slot with a
/// monotonically increasing token and a miss recycles the slot with the
/// lowest token. A miss hands back a cleared slot for the caller to fill.
pub struct ScriptParagraphCache {
    slots: Vec<Slot>,
    capacity: usize,
    next_token: u32,
}

impl ScriptParagraphCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity: capacity.max(1),
            next_token: 0,
        }
    }

    pub fn lookup(&mut self, paragraph_index: usize) -> CacheLookup {
        if let Some(hit) = self
            .slots
            .iter()
            .position(|slot| slot.paragraph_index == Some(paragraph_index))
        {
            self.touch(hit);
            return CacheLookup {
                found: true,
                slot: hit,
            };
        }

        let free = self.slots.iter().position(|slot| slot.paragraph_index.is_none());
        let slot = match free {
            Some(free) => free,
            None if self.slots.len() < self.capacity => {
                self.slots.push(Slot {
                    paragraph_index: None,
                    token: 0,
                    paragraph: ScriptParagraph::default(),
                });
                self.slots.len() - 1
            }
            None => {
                let oldest = self
                    .slots
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, slot)| slot.token)
                    .map_or(0, |(i, _)| i);
                trace!(
                    evicted = ?self.slots[oldest].paragraph_index,
                    paragraph_index,
                    "paragraph cache eviction"
                );
                oldest
            }
        };

        self.slots[slot].paragraph_index = Some(paragraph_index);
        self.slots[slot].paragraph.clear();
        self.touch(slot);
        CacheLookup { found: false, slot }
    }

    pub fn paragraph(&self, slot: usize) -> &ScriptParagraph {
        &self.slots[slot].paragraph
    }

    pub fn paragraph_mut(&mut self, slot: usize) -> &mut ScriptParagraph {
        &mut self.slots[slot].paragraph
    }

    /// Drop every entry for paragraphs at or after `first_invalid`
    pub fn remove_from(&mut self, first_invalid: usize) {
        for slot in &mut self.slots {
            if matches!(slot.paragraph_index, Some(index) if index >= first_invalid) {
                slot.paragraph_index = None;
                slot.paragraph.clear();
            }
        }
    }

    /// Drop everything and release storage
    pub fn clear(&mut self) {
        self.slots = Vec::new();
        self.next_token = 0;
    }

    fn touch(&mut self, slot: usize) {
        if self.next_token == u32::MAX {
            self.renumber();
        }
        self.slots[slot].token = self.next_token;
        self.next_token += 1;
    }

    /// Reassign tokens densely from zero, preserving their order
    fn renumber(&mut self) {
        let mut order: Vec<usize> = (0..self.slots.len()).collect();
        order.sort_by_key(|&i| self.slots[i].token);
        for (token, &i) in order.iter().enumerate() {
            self.slots[i].token = token as u32;
        }
        self.next_token = order.len() as u32;
        trace!(slots = order.len(), "paragraph cache tokens renumbered");
    }

    #[cfg(test)]
    fn set_next_token(&mut self, token: u32) {
        self.next_token = token;
    }

    /// Number of live entries
    #[cfg(test)]
    fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.paragraph_index.is_some())
            .count()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn contains(&self, paragraph_index: usize) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.paragraph_index == Some(paragraph_index))
    }
}
