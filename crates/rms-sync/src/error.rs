use std::time::Duration;

use rms_types::{Hash, TypeError};
use thiserror::Error;

/// Failures reported by a [`StoreTransport`](crate::StoreTransport).
///
/// Variants are passed through untouched so callers can tell a timeout from
/// a refused connection.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("object not found: {0}")]
    NotFound(Hash),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl TransportError {
    /// Whether repeating the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout(_) | TransportError::Connection(_) => true,
            TransportError::Status { status, .. } => *status == 429 || *status >= 500,
            TransportError::NotFound(_) | TransportError::InvalidResponse(_) => false,
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Errors from reading or advancing the root pointer.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The root moved since `expected` was read. The write had no effect.
    #[error("root generation {expected} is stale; re-read the root and recompute")]
    Conflict { expected: u64 },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("invalid root response: {0}")]
    InvalidResponse(String),

    #[error("unsupported root schema: {0}")]
    SchemaVersion(#[from] TypeError),

    /// The server accepted a write but answered in a way the CAS contract
    /// does not allow.
    #[error("root protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SyncError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, SyncError::Conflict { .. })
    }

    pub fn is_transient(&self) -> bool {
        match self {
            SyncError::Transport(e) => e.is_transient(),
            _ => false,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transience_classification() {
        assert!(TransportError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(TransportError::Connection("reset".into()).is_transient());
        assert!(TransportError::Status { status: 503, body: String::new() }.is_transient());
        assert!(TransportError::Status { status: 429, body: String::new() }.is_transient());
        assert!(!TransportError::Status { status: 400, body: String::new() }.is_transient());
        assert!(!TransportError::InvalidResponse("x".into()).is_transient());
    }

    #[test]
    fn conflict_is_never_transient() {
        let err = SyncError::Conflict { expected: 3 };
        assert!(err.is_conflict());
        assert!(!err.is_transient());
    }

    #[test]
    fn transport_transience_propagates() {
        let err = SyncError::from(TransportError::Connection("reset".into()));
        assert!(err.is_transient());
        assert!(!err.is_conflict());
    }
}
