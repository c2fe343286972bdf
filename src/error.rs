//! Error types for the editing core.

/// Errors surfaced by the editing core.
///
/// Side-channel parse failures and unbound keys are handled where they
/// occur and never surface here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Selection offsets out of order, past the end of the text, or not on a
    /// character boundary.
    #[error("invalid selection {start}..{end} for text of length {len}")]
    InvalidSelection { start: usize, end: usize, len: usize },

    /// A key-combination string that does not name exactly one key.
    #[error("invalid key combination: {0:?}")]
    InvalidCombo(String),

    /// An indent unit of zero width.
    #[error("indent width must be at least 1")]
    InvalidIndent,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
