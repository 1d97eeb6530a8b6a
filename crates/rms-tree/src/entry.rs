use std::fmt;

use rms_crypto::content_hash;
use rms_types::Hash;
use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::error::{TreeError, TreeResult};

/// Separator between fields of an index line.
pub const FIELD_DELIMITER: char = ':';

/// Whether an entry points at a plain blob or at another collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// A blob: document content, metadata, a page.
    File,
    /// A sub-collection: a document's file set or a folder's children.
    Collection,
}

impl EntryKind {
    /// Wire flag for [`EntryKind::File`].
    pub const FILE_FLAG: &'static str = "0";
    /// Wire flag for [`EntryKind::Collection`].
    pub const COLLECTION_FLAG: &'static str = "80000000";

    /// The flag written in the second field of an index line.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::File => Self::FILE_FLAG,
            Self::Collection => Self::COLLECTION_FLAG,
        }
    }

    /// Parse a wire flag.
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            Self::FILE_FLAG => Some(Self::File),
            Self::COLLECTION_FLAG => Some(Self::Collection),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Collection => write!(f, "collection"),
        }
    }
}

/// One line of a collection index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionEntry {
    /// Hash of the referenced blob or collection.
    pub hash: Hash,
    /// Blob or sub-collection.
    pub kind: EntryKind,
    /// Identifier, unique within the parent collection.
    pub id: String,
    /// Number of entries in the referenced collection; 0 for blobs.
    pub subfile_count: u64,
    /// Byte size of the blob, or total size of a collection's entries.
    pub size: u64,
}

impl CollectionEntry {
    /// Create an entry from raw fields.
    pub fn new(
        hash: Hash,
        kind: EntryKind,
        id: impl Into<String>,
        subfile_count: u64,
        size: u64,
    ) -> Self {
        Self {
            hash,
            kind,
            id: id.into(),
            subfile_count,
            size,
        }
    }

    /// Entry for a blob with the given contents.
    pub fn file(id: impl Into<String>, data: &[u8]) -> Self {
        Self::new(content_hash(data), EntryKind::File, id, 0, data.len() as u64)
    }

    /// Entry for a sub-collection, hashed over its canonical encoding.
    pub fn collection(id: impl Into<String>, collection: &Collection) -> Self {
        Self::new(
            collection.hash(),
            EntryKind::Collection,
            id,
            collection.len() as u64,
            collection.total_size(),
        )
    }

    /// Returns `true` if this entry points at a sub-collection.
    pub fn is_collection(&self) -> bool {
        self.kind == EntryKind::Collection
    }

    /// Check that an id can be written into an index line.
    pub fn validate_id(id: &str) -> TreeResult<()> {
        let reason = if id.is_empty() {
            "id must not be empty"
        } else if id.contains(FIELD_DELIMITER) {
            "id must not contain ':'"
        } else if id.contains('\n') || id.contains('\r') {
            "id must not contain a line break"
        } else {
            return Ok(());
        };
        Err(TreeError::InvalidId {
            id: id.to_string(),
            reason: reason.into(),
        })
    }

    pub(crate) fn write_line(&self, out: &mut String) {
        out.push_str(&self.hash.to_hex());
        out.push(FIELD_DELIMITER);
        out.push_str(self.kind.flag());
        out.push(FIELD_DELIMITER);
        out.push_str(&self.id);
        out.push(FIELD_DELIMITER);
        out.push_str(&self.subfile_count.to_string());
        out.push(FIELD_DELIMITER);
        out.push_str(&self.size.to_string());
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_roundtrip() {
        for kind in [EntryKind::File, EntryKind::Collection] {
            assert_eq!(EntryKind::from_flag(kind.flag()), Some(kind));
        }
        assert_eq!(EntryKind::from_flag("1"), None);
        assert_eq!(EntryKind::from_flag(""), None);
    }

    #[test]
    fn file_entry_hashes_contents() {
        let entry = CollectionEntry::file("doc.metadata", b"{}");
        assert_eq!(entry.hash, content_hash(b"{}"));
        assert_eq!(entry.size, 2);
        assert_eq!(entry.subfile_count, 0);
        assert!(!entry.is_collection());
    }

    #[test]
    fn collection_entry_summarises_children() {
        let child = Collection::new(
            rms_types::SchemaVersion::V3,
            vec![
                CollectionEntry::file("a", b"12345"),
                CollectionEntry::file("b", b"123"),
            ],
        )
        .unwrap();
        let entry = CollectionEntry::collection("doc", &child);
        assert!(entry.is_collection());
        assert_eq!(entry.subfile_count, 2);
        assert_eq!(entry.size, 8);
        assert_eq!(entry.hash, child.hash());
    }

    #[test]
    fn id_validation() {
        assert!(CollectionEntry::validate_id("abc-123.content").is_ok());
        assert!(CollectionEntry::validate_id("").is_err());
        assert!(CollectionEntry::validate_id("a:b").is_err());
        assert!(CollectionEntry::validate_id("a\nb").is_err());
    }

    #[test]
    fn line_layout() {
        let entry = CollectionEntry::file("x.pdf", b"pdf");
        let mut line = String::new();
        entry.write_line(&mut line);
        assert_eq!(line, format!("{}:0:x.pdf:0:3\n", entry.hash));
    }
}
