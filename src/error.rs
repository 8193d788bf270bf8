//! Error types surfaced at the public API boundary

use thiserror::Error;

/// Errors reported by document appends, layout configuration and queries.
///
/// Client callback failures never show up here; they are logged and
/// replaced with neutral results so a layout pass always completes.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("too many distinct styles: at most {max} may be interned")]
    TooManyStyles { max: usize },

    #[error("too many distinct embedded objects: at most {max} may be interned")]
    TooManyObjects { max: usize },

    #[error("layout width must be at least 1, got {0}")]
    InvalidLayoutWidth(i32),

    #[error("character range {start}+{length} is outside the document ({char_count} chars)")]
    CharRangeOutOfBounds {
        start: usize,
        length: usize,
        char_count: usize,
    },

    #[error("character index {index} is outside the document ({char_count} chars)")]
    CharIndexOutOfBounds { index: usize, char_count: usize },

    #[error("the default style cannot be popped")]
    StyleStackUnderflow,

    #[error("no annotation is open for key `{0}`")]
    NoCurrentAnnotation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
