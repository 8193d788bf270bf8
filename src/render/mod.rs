//! Render output: display list and layout diffs

mod diff;
mod display;

pub use diff::LayoutDiff;
pub use display::{DisplayItem, DisplayItemId, DisplayList, PaintOptions, Selection};
