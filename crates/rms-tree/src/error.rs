//! Error types for the collection index codec.

use thiserror::Error;

/// Errors from encoding or decoding a collection index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// The index bytes do not parse. Never repaired, always surfaced.
    #[error("malformed collection at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// An entry id cannot be represented in the index format.
    #[error("invalid entry id {id:?}: {reason}")]
    InvalidId { id: String, reason: String },

    /// Two entries in one collection share an id.
    #[error("duplicate entry id: {0}")]
    DuplicateId(String),

    /// Entry sizes sum past `u64::MAX`, so no summary or parent size exists.
    #[error("entry sizes overflow a 64-bit total")]
    SizeOverflow,
}

impl TreeError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        TreeError::Malformed {
            line,
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for codec operations.
pub type TreeResult<T> = std::result::Result<T, TreeError>;
