use async_trait::async_trait;
use rms_tree::{Collection, CollectionEntry};
use rms_types::Hash;

use crate::client::RawStoreClient;
use crate::error::ClientResult;

/// A change to the tree, expressed as a function of the current top level.
///
/// [`RawStoreClient::transact`] may call `apply` several times, once per
/// root generation it sees, so it must derive everything from `root` rather
/// than from state captured on an earlier call.
#[async_trait]
pub trait RootMutation: Send + Sync {
    /// Upload whatever the change needs and return the new top-level hash.
    async fn apply(&self, client: &RawStoreClient, root: &Collection) -> ClientResult<Hash>;
}

/// Set or remove the entry at a path, via [`RawStoreClient::replace_at_path`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplaceEntry {
    pub path: Vec<String>,
    pub leaf: Option<CollectionEntry>,
}

impl ReplaceEntry {
    pub fn new(path: Vec<String>, leaf: Option<CollectionEntry>) -> Self {
        Self { path, leaf }
    }

    /// Remove the entry at `path`.
    pub fn remove(path: Vec<String>) -> Self {
        Self { path, leaf: None }
    }
}

#[async_trait]
impl RootMutation for ReplaceEntry {
    async fn apply(&self, client: &RawStoreClient, root: &Collection) -> ClientResult<Hash> {
        let path: Vec<&str> = self.path.iter().map(String::as_str).collect();
        client.replace_at_path(root, &path, self.leaf.clone()).await
    }
}
