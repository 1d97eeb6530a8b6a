//! Content hashing for the raw store client.
//!
//! The store identifies every blob and collection by the SHA-256 digest of
//! its exact bytes. All hashing wraps the `sha2` crate — no custom
//! cryptography.

pub mod hasher;

pub use hasher::{content_hash, ContentHasher, HasherError};
