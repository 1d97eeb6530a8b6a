use std::sync::{Arc, RwLock};

use rms_types::{Hash, SchemaVersion};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::transport::{RootPutOutcome, StoreTransport};
use crate::types::{RootPointer, RootResponse, RootUpdate, RootUpdateResponse};

/// Reads and conditionally writes the root pointer.
///
/// There is no retry loop in here. A lost race surfaces as
/// [`SyncError::Conflict`]; resubmitting the same hash after a conflict could
/// discard another writer's change, so the caller must re-read and recompute.
pub struct RootSynchronizer {
    transport: Arc<dyn StoreTransport>,
    broadcast: bool,
    last_seen: RwLock<Option<RootPointer>>,
}

impl RootSynchronizer {
    pub fn new(transport: Arc<dyn StoreTransport>) -> Self {
        Self {
            transport,
            broadcast: true,
            last_seen: RwLock::new(None),
        }
    }

    /// Whether accepted writes ask the server to notify other devices.
    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    /// Fetch the current root pointer.
    ///
    /// A missing `schemaVersion` resolves through
    /// [`SchemaVersion::for_missing_field`]; an unknown one is an error.
    pub async fn read(&self) -> SyncResult<RootPointer> {
        let body = self.transport.get_root().await?;
        let response: RootResponse = serde_json::from_slice(&body)
            .map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
        let schema_version = SchemaVersion::resolve(response.schema_version)?;
        let root = RootPointer {
            hash: response.hash,
            generation: response.generation,
            schema_version,
        };
        if response.schema_version.is_none() {
            debug!(assumed = %schema_version, "root response omitted schemaVersion");
        }
        debug!(hash = %root.hash, generation = root.generation, "read root");
        self.remember(root);
        Ok(root)
    }

    /// Compare-and-swap the root to `new_hash`.
    ///
    /// Succeeds only if the server's generation still equals
    /// `expected_generation`, returning the incremented generation.
    pub async fn write(&self, new_hash: Hash, expected_generation: u64) -> SyncResult<u64> {
        let update = RootUpdate {
            hash: new_hash,
            generation: expected_generation,
            broadcast: self.broadcast,
        };
        let body =
            serde_json::to_vec(&update).map_err(|e| SyncError::Serialization(e.to_string()))?;

        match self.transport.put_root(body).await? {
            RootPutOutcome::Conflict => {
                warn!(
                    hash = %new_hash,
                    expected = expected_generation,
                    "root write lost a generation race"
                );
                Err(SyncError::Conflict {
                    expected: expected_generation,
                })
            }
            RootPutOutcome::Accepted(reply) => {
                let response: RootUpdateResponse = serde_json::from_slice(&reply)
                    .map_err(|e| SyncError::InvalidResponse(e.to_string()))?;
                let next = expected_generation.checked_add(1).ok_or_else(|| {
                    SyncError::ProtocolViolation("generation counter overflow".into())
                })?;
                if response.generation != next {
                    return Err(SyncError::ProtocolViolation(format!(
                        "write from generation {expected_generation} returned generation {}",
                        response.generation
                    )));
                }
                if let Some(hash) = response.hash {
                    if hash != new_hash {
                        return Err(SyncError::ProtocolViolation(format!(
                            "wrote root {new_hash}, server reports {hash}"
                        )));
                    }
                }
                let schema_version = self
                    .last_seen()
                    .map(|r| r.schema_version)
                    .unwrap_or_else(SchemaVersion::for_missing_field);
                self.remember(RootPointer {
                    hash: new_hash,
                    generation: next,
                    schema_version,
                });
                info!(hash = %new_hash, generation = next, "advanced root");
                Ok(next)
            }
        }
    }

    /// The last root pointer read or written through this synchronizer.
    ///
    /// Diagnostics only: it may be stale the moment it is returned.
    pub fn last_seen(&self) -> Option<RootPointer> {
        *self.last_seen.read().expect("lock poisoned")
    }

    fn remember(&self, root: RootPointer) {
        *self.last_seen.write().expect("lock poisoned") = Some(root);
    }
}
