//! Foundation types for the raw store client.
//!
//! Every other `rms-*` crate depends on `rms-types`.
//!
//! # Key Types
//!
//! - [`Hash`] — Content-addressed identifier (SHA-256 digest, hex on the wire)
//! - [`SchemaVersion`] — Known server schema versions and the table mapping
//!   missing version fields to a concrete version

pub mod error;
pub mod hash;
pub mod version;

pub use error::TypeError;
pub use hash::Hash;
pub use version::SchemaVersion;
