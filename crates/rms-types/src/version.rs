use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Server schema versions the client knows how to speak.
///
/// The version governs both the collection index layout and the shape of the
/// root endpoint's payload. New server versions are added here, together with
/// a row in [`SchemaVersion::KNOWN`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub enum SchemaVersion {
    /// Flat index: version line followed by entry lines.
    V3,
    /// Index with an additional summary line after the version line.
    V4,
}

impl SchemaVersion {
    /// Every known version, oldest first.
    pub const KNOWN: [SchemaVersion; 2] = [SchemaVersion::V3, SchemaVersion::V4];

    /// The version to assume when a response omits the version field.
    ///
    /// Servers that predate the field only ever spoke the oldest version, so
    /// absence maps to [`SchemaVersion::V3`]. Revisit when a newer server is
    /// observed omitting it.
    pub const fn for_missing_field() -> Self {
        SchemaVersion::V3
    }

    /// The oldest known version.
    pub const fn oldest() -> Self {
        SchemaVersion::V3
    }

    /// The newest known version.
    pub const fn newest() -> Self {
        SchemaVersion::V4
    }

    /// Numeric wire value.
    pub const fn as_u64(self) -> u64 {
        match self {
            SchemaVersion::V3 => 3,
            SchemaVersion::V4 => 4,
        }
    }

    /// Resolve an optional wire value through the missing-field table.
    pub fn resolve(raw: Option<u64>) -> Result<Self, TypeError> {
        match raw {
            Some(v) => Self::try_from(v),
            None => Ok(Self::for_missing_field()),
        }
    }
}

impl TryFrom<u64> for SchemaVersion {
    type Error = TypeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::KNOWN
            .into_iter()
            .find(|v| v.as_u64() == value)
            .ok_or(TypeError::UnknownSchemaVersion(value))
    }
}

impl From<SchemaVersion> for u64 {
    fn from(version: SchemaVersion) -> Self {
        version.as_u64()
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}
