//! Shared handle for update requests and the re-entrancy guard

use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct SignalState {
    updating: Cell<bool>,
    update_required: Cell<bool>,
    itemization_from: Cell<Option<usize>>,
    layout_from: Cell<Option<usize>>,
    suppressed_updates: Cell<u32>,
}

/// Cloneable handle through which embedded-object callbacks and hosts ask
/// a layout for more work.
///
/// Requests never run layout inline. They lower queued watermarks that the
/// layout merges at the start of its next update, or right after the
/// current one when made from inside a pass.
#[derive(Debug, Clone, Default)]
pub struct LayoutSignal {
    state: Rc<SignalState>,
}

impl LayoutSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a layout update is in progress
    pub fn is_updating(&self) -> bool {
        self.state.updating.get()
    }

    /// Whether the owning layout has work pending
    pub fn is_update_required(&self) -> bool {
        self.state.update_required.get()
    }

    pub fn invalidate_paragraph_itemization(&self, paragraph_index: usize) {
        lower(&self.state.itemization_from, paragraph_index);
        self.invalidate_paragraph_layout(paragraph_index);
    }

    pub fn invalidate_paragraph_layout(&self, paragraph_index: usize) {
        lower(&self.state.layout_from, paragraph_index);
        self.request_update();
    }

    /// Ask for an update; counted as suppressed when made during one
    pub fn request_update(&self) {
        if self.is_updating() {
            self.state
                .suppressed_updates
                .set(self.state.suppressed_updates.get() + 1);
        }
        self.state.update_required.set(true);
    }

    /// Number of requests that arrived while an update was running
    pub fn suppressed_updates(&self) -> u32 {
        self.state.suppressed_updates.get()
    }

    pub(crate) fn set_update_required(&self, required: bool) {
        self.state.update_required.set(required);
    }

    /// Queued (itemization, layout) watermarks, cleared on read
    pub(crate) fn take_requests(&self) -> (Option<usize>, Option<usize>) {
        (
            self.state.itemization_from.take(),
            self.state.layout_from.take(),
        )
    }

    /// Enter the layout critical section; `None` if already inside it
    pub(crate) fn enter(&self) -> Option<UpdateGuard> {
        if self.state.updating.replace(true) {
            return None;
        }
        Some(UpdateGuard {
            state: Rc::clone(&self.state),
        })
    }
}

fn lower(watermark: &Cell<Option<usize>>, index: usize) {
    let lowered = match watermark.get() {
        Some(current) => current.min(index),
        None => index,
    };
    watermark.set(Some(lowered));
}

/// Marks an update in progress until dropped
pub(crate) struct UpdateGuard {
    state: Rc<SignalState>,
}

impl Drop for UpdateGuard {
    fn drop(&mut self) {
        self.state.updating.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_rejects_nested_entry() {
        let signal = LayoutSignal::new();
        let guard = signal.enter();
        assert!(guard.is_some());
        assert!(signal.is_updating());
        assert!(signal.clone().enter().is_none());
        drop(guard);
        assert!(!signal.is_updating());
        assert!(signal.enter().is_some());
    }

    #[test]
    fn test_requests_only_lower_watermarks() {
        let signal = LayoutSignal::new();
        signal.invalidate_paragraph_layout(5);
        signal.invalidate_paragraph_itemization(7);
        signal.invalidate_paragraph_layout(9);
        assert!(signal.is_update_required());
        assert_eq!(signal.take_requests(), (Some(7), Some(5)));
        assert_eq!(signal.take_requests(), (None, None));
    }

    #[test]
    fn test_requests_during_update_are_counted() {
        let signal = LayoutSignal::new();
        signal.request_update();
        assert_eq!(signal.suppressed_updates(), 0);

        let _guard = signal.enter();
        signal.request_update();
        assert_eq!(signal.suppressed_updates(), 1);
    }
}
