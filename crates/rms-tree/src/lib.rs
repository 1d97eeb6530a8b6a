//! Hash-tree model for the raw store client.
//!
//! Folders and documents in the remote store are *collections*: flat,
//! versioned text indexes listing child entries by hash. This crate encodes
//! and decodes that index format and computes the content hashes that tie
//! the tree together.
//!
//! # Index format
//!
//! ```text
//! 3
//! <hash>:80000000:<id>:<subfile count>:<size>
//! <hash>:0:<id>:0:<size>
//! ```
//!
//! Version 4 inserts a summary line `0:.:<entry count>:<total size>` after
//! the version line.
//!
//! # Design Rules
//!
//! 1. Entries are emitted in canonical order (byte-wise by id), so equal
//!    entry sets always hash the same.
//! 2. Decoding is strict: malformed input is an error, never a partial parse.
//! 3. Hashes are taken over the exact bytes that go on the wire.

pub mod codec;
pub mod collection;
pub mod entry;
pub mod error;

pub use codec::{decode, encode, DecodedIndex};
pub use collection::Collection;
pub use entry::{CollectionEntry, EntryKind};
pub use error::{TreeError, TreeResult};
pub use rms_crypto::content_hash;
