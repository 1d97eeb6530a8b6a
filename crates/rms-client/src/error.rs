use rms_cache::CacheError;
use rms_crypto::HasherError;
use rms_schema::{SchemaError, ValidationError};
use rms_sync::{SyncError, Transient, TransportError};
use rms_tree::TreeError;
use rms_types::Hash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Fetched bytes do not hash to the hash they were requested by.
    #[error("blob {expected} arrived with content hashing to {actual}")]
    HashMismatch { expected: Hash, actual: Hash },

    #[error("blob {hash} is not valid JSON: {reason}")]
    InvalidJson { hash: Hash, reason: String },

    /// Every attempt of a root transaction lost its generation race.
    #[error("root transaction gave up after {attempts} conflicting attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("collection error: {0}")]
    Tree(#[from] TreeError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("root sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("serialization error: {0}")]
    Serialization(#[from] HasherError),
}

impl ClientError {
    /// The root moved underneath a write.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Sync(e) if e.is_conflict())
    }

    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(e) => e.is_transient(),
            ClientError::Sync(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl Transient for ClientError {
    fn is_transient(&self) -> bool {
        ClientError::is_transient(self)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
