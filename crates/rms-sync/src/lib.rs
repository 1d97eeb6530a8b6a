//! Root pointer synchronization for the raw store client.
//!
//! The remote store has exactly one mutable value: the root pointer, naming
//! the hash of the top-level collection plus a generation counter. This
//! crate reads it and advances it with compare-and-swap semantics.
//!
//! # Architecture
//!
//! - [`StoreTransport`] is the seam to the network. Implementations own
//!   timeouts, authentication and hosts; this crate only sees bytes.
//! - [`RootSynchronizer`] parses root responses and issues CAS writes. It
//!   never retries: a [`SyncError::Conflict`] means the caller must re-read
//!   the root and recompute its change against the new tree.
//! - [`retry_transient`] retries *transient* transport failures with bounded
//!   exponential backoff. Conflicts are never transient.
//! - [`MemoryTransport`] is an in-memory server for tests and embedding.

pub mod error;
pub mod memory;
pub mod retry;
pub mod root;
pub mod transport;
pub mod types;

pub use error::{SyncError, SyncResult, TransportError, TransportResult};
pub use memory::MemoryTransport;
pub use retry::{retry_transient, RetryPolicy, Transient};
pub use root::RootSynchronizer;
pub use transport::{RootPutOutcome, StoreTransport};
pub use types::{RootPointer, RootUpdate};
