//! Root pointer types and their wire forms.

use rms_types::{Hash, SchemaVersion};
use serde::{Deserialize, Serialize};

/// The single mutable reference to the current tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootPointer {
    /// Hash of the top-level collection.
    pub hash: Hash,
    /// Incremented exactly once per successful write. Used only to detect
    /// concurrent writers, not to version content.
    pub generation: u64,
    pub schema_version: SchemaVersion,
}

/// Body of a root `GET`. Older servers omit `schemaVersion`.
#[derive(Debug, Deserialize)]
pub(crate) struct RootResponse {
    pub hash: Hash,
    pub generation: u64,
    #[serde(default, rename = "schemaVersion")]
    pub schema_version: Option<u64>,
}

/// Body of a conditional root `PUT`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootUpdate {
    pub hash: Hash,
    /// The generation the writer last observed.
    pub generation: u64,
    /// Ask the server to notify other devices.
    pub broadcast: bool,
}

/// Body of an accepted root `PUT`.
#[derive(Debug, Deserialize)]
pub(crate) struct RootUpdateResponse {
    pub generation: u64,
    #[serde(default)]
    pub hash: Option<Hash>,
}
