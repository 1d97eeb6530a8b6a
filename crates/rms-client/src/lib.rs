//! High-level client for the raw document store.
//!
//! Ties the lower crates together behind one API: hash-verified, cached
//! blob access ([`rms_cache`]), collection indexes ([`rms_tree`]), validated
//! JSON entities ([`rms_schema`]) and compare-and-swap root updates
//! ([`rms_sync`]). This is the entry point for applications.
//!
//! ```no_run
//! # async fn demo(transport: std::sync::Arc<dyn rms_client::StoreTransport>)
//! #     -> rms_client::ClientResult<()> {
//! use rms_client::{ClientConfig, RawStoreClient};
//!
//! let client = RawStoreClient::new(transport, ClientConfig::default())?;
//! let root = client.get_root().await?;
//! for entry in client.list_entries(&root.hash).await? {
//!     println!("{} {}", entry.id, entry.hash);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod transaction;

pub use client::{BlobCache, RawStoreClient};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use transaction::{ReplaceEntry, RootMutation};

// Re-export key types
pub use rms_schema::{EntityKind, ValidatedEntity, ValidationError};
pub use rms_sync::{MemoryTransport, RetryPolicy, RootPointer, StoreTransport, TransportError};
pub use rms_tree::{Collection, CollectionEntry, EntryKind};
pub use rms_types::{Hash, SchemaVersion};
