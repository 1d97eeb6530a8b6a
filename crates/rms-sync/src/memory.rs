use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use rms_crypto::ContentHasher;
use rms_types::Hash;
use serde_json::json;

use crate::error::{TransportError, TransportResult};
use crate::transport::{RootPutOutcome, StoreTransport};
use crate::types::RootUpdate;

struct RootState {
    hash: Hash,
    generation: u64,
    schema_version: Option<u64>,
}

/// In-memory store server.
///
/// Intended for tests and embedding. Implements the same conditional root
/// write a real server does, so racing clients observe real conflicts.
/// Failures can be queued with [`fail_next`](Self::fail_next).
pub struct MemoryTransport {
    root: RwLock<RootState>,
    blobs: RwLock<HashMap<Hash, Bytes>>,
    faults: Mutex<VecDeque<TransportError>>,
}

impl MemoryTransport {
    /// A server whose root names `initial_root` at generation 0.
    pub fn new(initial_root: Hash) -> Self {
        Self {
            root: RwLock::new(RootState {
                hash: initial_root,
                generation: 0,
                schema_version: None,
            }),
            blobs: RwLock::new(HashMap::new()),
            faults: Mutex::new(VecDeque::new()),
        }
    }

    /// Report `schemaVersion` in root responses. `None` omits the field.
    pub fn with_schema_version(self, version: Option<u64>) -> Self {
        self.root.write().expect("lock poisoned").schema_version = version;
        self
    }

    /// Store `data` directly, bypassing hash checks on the wire path.
    pub fn insert_blob(&self, data: impl Into<Bytes>) -> Hash {
        let data = data.into();
        let hash = ContentHasher::hash(&data);
        self.blobs.write().expect("lock poisoned").insert(hash, data);
        hash
    }

    /// Current `(hash, generation)`.
    pub fn root(&self) -> (Hash, u64) {
        let state = self.root.read().expect("lock poisoned");
        (state.hash, state.generation)
    }

    /// Move the root as another device would.
    pub fn advance_root(&self, hash: Hash) -> u64 {
        let mut state = self.root.write().expect("lock poisoned");
        state.hash = hash;
        state.generation += 1;
        state.generation
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Fail the next request, whichever it is, with `err`.
    pub fn fail_next(&self, err: TransportError) {
        self.faults.lock().expect("lock poisoned").push_back(err);
    }

    fn injected_fault(&self) -> TransportResult<()> {
        match self.faults.lock().expect("lock poisoned").pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StoreTransport for MemoryTransport {
    async fn get_root(&self) -> TransportResult<Vec<u8>> {
        self.injected_fault()?;
        let state = self.root.read().expect("lock poisoned");
        let mut body = json!({
            "hash": state.hash,
            "generation": state.generation,
        });
        if let Some(version) = state.schema_version {
            body["schemaVersion"] = json!(version);
        }
        serde_json::to_vec(&body).map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    async fn put_root(&self, body: Vec<u8>) -> TransportResult<RootPutOutcome> {
        self.injected_fault()?;
        let update: RootUpdate =
            serde_json::from_slice(&body).map_err(|e| TransportError::Status {
                status: 400,
                body: e.to_string(),
            })?;

        let mut state = self.root.write().expect("lock poisoned");
        if state.generation != update.generation {
            return Ok(RootPutOutcome::Conflict);
        }
        state.hash = update.hash;
        state.generation += 1;
        let reply = json!({"hash": state.hash, "generation": state.generation});
        serde_json::to_vec(&reply)
            .map(RootPutOutcome::Accepted)
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    async fn get_blob(&self, hash: &Hash) -> TransportResult<Bytes> {
        self.injected_fault()?;
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(hash)
            .cloned()
            .ok_or(TransportError::NotFound(*hash))
    }

    async fn put_blob(&self, hash: &Hash, data: Bytes) -> TransportResult<()> {
        self.injected_fault()?;
        if !ContentHasher::verify(&data, hash) {
            return Err(TransportError::Status {
                status: 400,
                body: format!("content does not hash to {hash}"),
            });
        }
        self.blobs.write().expect("lock poisoned").entry(*hash).or_insert(data);
        Ok(())
    }
}
