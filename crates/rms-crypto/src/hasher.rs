use rms_types::Hash;
use sha2::{Digest, Sha256};

/// SHA-256 content hasher.
///
/// The digest is taken over exactly the bytes handed in. Callers must pass the
/// canonical bytes they upload, never a re-serialized copy, so that any
/// encoding drift shows up as a hash mismatch instead of being papered over.
#[derive(Default)]
pub struct ContentHasher {
    inner: Sha256,
}

impl ContentHasher {
    /// Start an incremental hash.
    pub fn new() -> Self {
        Self {
            inner: Sha256::new(),
        }
    }

    /// Feed more bytes into the running digest.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finish the digest.
    pub fn finalize(self) -> Hash {
        Hash::from_digest(self.inner.finalize().into())
    }

    /// Hash a byte slice in one step.
    pub fn hash(data: &[u8]) -> Hash {
        Hash::from_digest(Sha256::digest(data).into())
    }

    /// Hash a serializable value as compact JSON.
    pub fn hash_json<T: serde::Serialize>(value: &T) -> Result<(Vec<u8>, Hash), HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        let hash = Self::hash(&data);
        Ok((data, hash))
    }

    /// Verify that data produces the expected hash.
    pub fn verify(data: &[u8], expected: &Hash) -> bool {
        Self::hash(data) == *expected
    }
}

/// Hash a byte slice. Shorthand for [`ContentHasher::hash`].
pub fn content_hash(data: &[u8]) -> Hash {
    ContentHasher::hash(data)
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
