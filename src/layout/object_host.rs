//! Lifecycle of embedded-object clients owned by a layout

use crate::document::{Document, EmbeddedObjectClient, EmbeddedObjectSite, RunKind};
use crate::layout::script::ScriptParagraph;
use crate::layout::signal::LayoutSignal;
use crate::Rect;
use rustc_hash::{FxHashMap, FxHashSet};
use std::panic::{self, AssertUnwindSafe};
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCreate {
    char_index: usize,
    object_index: usize,
    paragraph_style_index: usize,
    inline_style_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingShow {
    char_index: usize,
    bounds: Rect,
}

/// Clients keyed by the character index of their placeholder.
///
/// Creation and showing are queued while layout runs and performed once
/// the line table is complete, so client callbacks never observe a
/// half-built layout.
#[derive(Default)]
pub struct ObjectHost {
    clients: FxHashMap<usize, Box<dyn EmbeddedObjectClient>>,
    /// Objects that declined to create a client
    unhosted: FxHashSet<usize>,
    bounds: FxHashMap<usize, Rect>,
    pending_creates: Vec<PendingCreate>,
    pending_shows: Vec<PendingShow>,
}

impl ObjectHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    #[cfg(test)]
    fn has_client(&self, char_index: usize) -> bool {
        self.clients.contains_key(&char_index)
    }

    /// Last bounds a client was shown at
    pub fn bounds(&self, char_index: usize) -> Option<Rect> {
        self.bounds.get(&char_index).copied()
    }

    #[cfg(test)]
    fn has_pending_work(&self) -> bool {
        !self.pending_creates.is_empty() || !self.pending_shows.is_empty()
    }

    /// Queue client creation for the objects of a freshly analyzed paragraph
    pub fn enqueue_creates(&mut self, paragraph: &ScriptParagraph) {
        let Some(first) = paragraph.runs.first() else {
            return;
        };
        let paragraph_style_index = first.style_index;
        for run in &paragraph.runs {
            let (RunKind::Object, Some(object_index)) = (run.kind, run.object_index) else {
                continue;
            };
            let char_index = paragraph.char_index + run.char_index_in_paragraph;
            if self.clients.contains_key(&char_index)
                || self.unhosted.contains(&char_index)
                || self.pending_creates.iter().any(|p| p.char_index == char_index)
            {
                continue;
            }
            self.pending_creates.push(PendingCreate {
                char_index,
                object_index,
                paragraph_style_index,
                inline_style_index: run.style_index,
            });
        }
    }

    pub fn queue_show(&mut self, char_index: usize, bounds: Rect) {
        self.pending_shows.push(PendingShow { char_index, bounds });
    }

    /// Create queued clients, then show every client with queued bounds
    pub fn drain(&mut self, document: &Document, signal: &LayoutSignal, right_to_left: bool) {
        for create in std::mem::take(&mut self.pending_creates) {
            if create.object_index >= document.object_count() {
                continue;
            }
            let object = document.object(create.object_index);
            let site = EmbeddedObjectSite {
                paragraph_style: document.style(create.paragraph_style_index),
                inline_style: document.style(create.inline_style_index),
                char_index: create.char_index,
                right_to_left,
                signal,
            };
            match panic::catch_unwind(AssertUnwindSafe(|| object.create_client(&site))) {
                Ok(Some(client)) => {
                    trace!(char_index = create.char_index, "embedded object client created");
                    self.clients.insert(create.char_index, client);
                }
                Ok(None) => {
                    self.unhosted.insert(create.char_index);
                }
                Err(_) => {
                    warn!(char_index = create.char_index, "embedded object panicked creating its client");
                    self.unhosted.insert(create.char_index);
                }
            }
        }

        for show in std::mem::take(&mut self.pending_shows) {
            let Some(client) = self.clients.get_mut(&show.char_index) else {
                continue;
            };
            let shown = panic::catch_unwind(AssertUnwindSafe(|| {
                client.show(show.bounds, right_to_left)
            }));
            if shown.is_err() {
                warn!(char_index = show.char_index, "embedded object client panicked in show");
            }
            self.bounds.insert(show.char_index, show.bounds);
        }
    }

    /// Hide and drop every client and forget queued work
    pub fn hide_all(&mut self) {
        for (char_index, mut client) in self.clients.drain() {
            if panic::catch_unwind(AssertUnwindSafe(|| client.hide())).is_err() {
                warn!(char_index, "embedded object client panicked in hide");
            }
        }
        self.unhosted.clear();
        self.bounds.clear();
        self.pending_creates.clear();
        self.pending_shows.clear();
    }
}

impl Drop for ObjectHost {
    fn drop(&mut self) {
        self.hide_all();
    }
}
