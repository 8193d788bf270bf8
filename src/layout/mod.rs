//! Layout engine with incremental updates

mod analyzer;
mod bidi;
mod cache;
mod engine;
pub mod font;
mod line_break;
mod object_host;
mod script;
pub mod shaper;
mod signal;
mod simple_shaper;

pub use bidi::VisualRun;
pub(crate) use engine::object_box;
pub use engine::{CaretPosition, Layout, LayoutConfig};
pub use font::{FontFace, FontLibrary, FontMetrics};
pub use hit_test::{SnapKind, SnapPosition};
pub use script::{RunSlice, ScriptLine, ScriptParagraph, ScriptRun};
pub use shaper::{Abc, CharHit, ScriptAnalysis, ShapeError, TextShaper};
pub use signal::LayoutSignal;
pub use simple_shaper::SimpleShaper;
