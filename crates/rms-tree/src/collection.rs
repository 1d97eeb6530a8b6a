use rms_crypto::content_hash;
use rms_types::{Hash, SchemaVersion};

use crate::codec::{self, DecodedIndex};
use crate::entry::CollectionEntry;
use crate::error::{TreeError, TreeResult};

/// A versioned, hashable list of entries (a folder's children or a
/// document's files).
///
/// Entries are always held in canonical order with unique ids, and their
/// sizes always sum to a value that fits in a `u64`. So
/// [`Collection::encode`] cannot fail and equal entry sets always produce
/// equal hashes. Collections are values: every edit yields a different hash,
/// and nothing here talks to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection {
    version: SchemaVersion,
    entries: Vec<CollectionEntry>,
}

impl Collection {
    /// Build a collection, sorting entries by id.
    pub fn new(version: SchemaVersion, mut entries: Vec<CollectionEntry>) -> TreeResult<Self> {
        for entry in &entries {
            CollectionEntry::validate_id(&entry.id)?;
        }
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(dup) = entries.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(TreeError::DuplicateId(dup[0].id.clone()));
        }
        if codec::total_size(&entries).is_none() {
            return Err(TreeError::SizeOverflow);
        }
        Ok(Self { version, entries })
    }

    /// An empty collection.
    pub fn empty(version: SchemaVersion) -> Self {
        Self {
            version,
            entries: Vec::new(),
        }
    }

    /// Decode index bytes fetched from the store.
    ///
    /// On top of [`codec::decode`], requires the entries to already be in
    /// canonical order: re-encoding a collection the server ordered
    /// differently would silently change its hash.
    pub fn decode(bytes: &[u8]) -> TreeResult<Self> {
        let DecodedIndex { version, entries } = codec::decode(bytes)?;
        let header_lines = if version == SchemaVersion::V4 { 2 } else { 1 };
        if let Some(pos) = entries.windows(2).position(|w| w[0].id > w[1].id) {
            return Err(TreeError::Malformed {
                line: header_lines + pos + 2,
                reason: format!(
                    "entry {:?} is out of canonical order",
                    entries[pos + 1].id
                ),
            });
        }
        Ok(Self { version, entries })
    }

    /// Canonical index bytes.
    pub fn encode(&self) -> Vec<u8> {
        codec::encode_sorted(self.version, self.entries.iter())
    }

    /// Hash of the canonical encoding.
    pub fn hash(&self) -> Hash {
        content_hash(&self.encode())
    }

    /// Index schema version.
    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Entries in canonical order.
    pub fn entries(&self) -> &[CollectionEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<CollectionEntry> {
        self.entries
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &str) -> Option<&CollectionEntry> {
        self.position(id).ok().map(|i| &self.entries[i])
    }

    /// Insert or replace the entry with `entry.id`, returning the old one.
    ///
    /// Leaves the collection unchanged on error.
    pub fn upsert(&mut self, entry: CollectionEntry) -> TreeResult<Option<CollectionEntry>> {
        CollectionEntry::validate_id(&entry.id)?;
        let position = self.position(&entry.id);
        let replaced = position.map_or(0, |i| self.entries[i].size);
        (self.total_size() - replaced)
            .checked_add(entry.size)
            .ok_or(TreeError::SizeOverflow)?;
        match position {
            Ok(i) => Ok(Some(std::mem::replace(&mut self.entries[i], entry))),
            Err(i) => {
                self.entries.insert(i, entry);
                Ok(None)
            }
        }
    }

    /// Remove the entry with `id`, returning it.
    pub fn remove(&mut self, id: &str) -> Option<CollectionEntry> {
        self.position(id).ok().map(|i| self.entries.remove(i))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of entry sizes. Never overflows: every constructor and edit
    /// rejects entries that would push it past `u64::MAX`.
    pub fn total_size(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, e| total.saturating_add(e.size))
    }

    fn position(&self, id: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|e| e.id.as_str().cmp(id))
    }
}
