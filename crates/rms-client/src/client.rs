use std::sync::Arc;

use bytes::Bytes;
use rms_cache::{CacheStats, LruCache};
use rms_crypto::ContentHasher;
use rms_schema::{EntityKind, SchemaValidator, ValidatedEntity};
use rms_sync::{retry_transient, RootPointer, RootSynchronizer, StoreTransport};
use rms_tree::{Collection, CollectionEntry};
use rms_types::Hash;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::transaction::RootMutation;

/// Shared blob cache, keyed by content hash.
pub type BlobCache = LruCache<Hash, Bytes>;

/// Typed access to a remote content-addressable store.
///
/// Blobs are verified against their hash before they are cached or parsed,
/// JSON entities are validated before they are returned or uploaded, and
/// root writes are compare-and-swap. Only root reads and blob transfers are
/// retried on transient failures; a root write is never resent.
pub struct RawStoreClient {
    transport: Arc<dyn StoreTransport>,
    cache: Arc<BlobCache>,
    validator: Arc<SchemaValidator>,
    root: RootSynchronizer,
    config: ClientConfig,
}

impl RawStoreClient {
    /// Client with its own cache sized from `config`.
    pub fn new(transport: Arc<dyn StoreTransport>, config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let cache = Arc::new(LruCache::new(config.cache_capacity)?);
        Self::with_cache(transport, cache, config)
    }

    /// Client sharing an existing cache, e.g. with another account's client.
    pub fn with_cache(
        transport: Arc<dyn StoreTransport>,
        cache: Arc<BlobCache>,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        config.validate()?;
        let validator = Arc::new(SchemaValidator::new()?);
        let root = RootSynchronizer::new(transport.clone()).with_broadcast(config.broadcast);
        Ok(Self {
            transport,
            cache,
            validator,
            root,
            config,
        })
    }

    /// Swap in a validator compiled from a custom schema set.
    pub fn with_validator(mut self, validator: Arc<SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Last root pointer this client read or wrote. May already be stale.
    pub fn last_seen_root(&self) -> Option<RootPointer> {
        self.root.last_seen()
    }

    // ---- Root ----

    pub async fn get_root(&self) -> ClientResult<RootPointer> {
        let root = retry_transient(&self.config.retry, || self.root.read()).await?;
        Ok(root)
    }

    /// Conditionally move the root to `hash`. Returns the new generation, or
    /// a conflict error if the root moved since `expected_generation`.
    pub async fn put_root(&self, hash: Hash, expected_generation: u64) -> ClientResult<u64> {
        Ok(self.root.write(hash, expected_generation).await?)
    }

    // ---- Blobs ----

    /// Fetch a blob, from the cache when possible.
    pub async fn get_blob(&self, hash: &Hash) -> ClientResult<Bytes> {
        if let Some(data) = self.cache.get(hash) {
            return Ok(data);
        }
        let data =
            retry_transient(&self.config.retry, || self.transport.get_blob(hash)).await?;
        let actual = ContentHasher::hash(&data);
        if actual != *hash {
            warn!(expected = %hash, %actual, "server returned content under the wrong hash");
            return Err(ClientError::HashMismatch {
                expected: *hash,
                actual,
            });
        }
        debug!(%hash, size = data.len(), "fetched blob");
        self.cache.set(*hash, data.clone());
        Ok(data)
    }

    /// Upload a blob under its content hash. Re-uploading is harmless.
    pub async fn put_blob(&self, data: impl Into<Bytes>) -> ClientResult<Hash> {
        let data = data.into();
        let hash = ContentHasher::hash(&data);
        retry_transient(&self.config.retry, || {
            self.transport.put_blob(&hash, data.clone())
        })
        .await?;
        debug!(%hash, size = data.len(), "uploaded blob");
        self.cache.set(hash, data);
        Ok(hash)
    }

    // ---- Collections ----

    pub async fn get_collection(&self, hash: &Hash) -> ClientResult<Collection> {
        let data = self.get_blob(hash).await?;
        Ok(Collection::decode(&data)?)
    }

    pub async fn list_entries(&self, hash: &Hash) -> ClientResult<Vec<CollectionEntry>> {
        Ok(self.get_collection(hash).await?.into_entries())
    }

    pub async fn put_collection(&self, collection: &Collection) -> ClientResult<Hash> {
        self.put_blob(collection.encode()).await
    }

    // ---- Entities ----

    /// Fetch a JSON blob and validate it as `kind`.
    pub async fn get_entity(&self, hash: &Hash, kind: EntityKind) -> ClientResult<ValidatedEntity> {
        let data = self.get_blob(hash).await?;
        let value: Value = serde_json::from_slice(&data).map_err(|e| ClientError::InvalidJson {
            hash: *hash,
            reason: e.to_string(),
        })?;
        Ok(self.validator.validate(kind, value)?)
    }

    pub async fn get_metadata(&self, hash: &Hash) -> ClientResult<ValidatedEntity> {
        self.get_entity(hash, EntityKind::Metadata).await
    }

    /// Fetch a `.content` blob, validated as document or folder content
    /// according to the `type` in its already-validated metadata.
    pub async fn get_content(
        &self,
        hash: &Hash,
        metadata: &ValidatedEntity,
    ) -> ClientResult<ValidatedEntity> {
        let kind = match metadata.value.get("type").and_then(Value::as_str) {
            Some("CollectionType") => EntityKind::CollectionContent,
            _ => EntityKind::DocumentContent,
        };
        self.get_entity(hash, kind).await
    }

    /// Validate `payload` as `kind` and upload it as compact JSON.
    ///
    /// Nothing is uploaded if validation fails.
    pub async fn put_entity(&self, kind: EntityKind, payload: &Value) -> ClientResult<Hash> {
        self.validator.validate(kind, payload.clone())?;
        let (data, _) = ContentHasher::hash_json(payload)?;
        self.put_blob(data).await
    }

    // ---- Tree edits ----

    /// Set (or with `None`, remove) the entry at `path` below `root`.
    ///
    /// The last path element is the leaf id; the ones before it name the
    /// collections to descend through. Every collection on the way down is
    /// re-encoded and uploaded, children before parents, and the new
    /// top-level hash is returned. Siblings keep their entries and hashes.
    pub async fn replace_at_path(
        &self,
        root: &Collection,
        path: &[&str],
        leaf: Option<CollectionEntry>,
    ) -> ClientResult<Hash> {
        let Some((leaf_id, parents)) = path.split_last() else {
            return Err(ClientError::InvalidPath("path is empty".into()));
        };
        if let Some(entry) = &leaf {
            if entry.id != *leaf_id {
                return Err(ClientError::InvalidPath(format!(
                    "leaf id {:?} does not match path element {leaf_id:?}",
                    entry.id
                )));
            }
        }

        let mut ancestors = Vec::with_capacity(parents.len());
        let mut current = root.clone();
        for (depth, id) in parents.iter().enumerate() {
            let hash = match current.get(id) {
                Some(entry) if entry.is_collection() => entry.hash,
                _ => {
                    return Err(ClientError::InvalidPath(format!(
                        "{} is not a collection",
                        path[..=depth].join("/")
                    )))
                }
            };
            let child = self.get_collection(&hash).await?;
            ancestors.push(std::mem::replace(&mut current, child));
        }

        match leaf {
            Some(entry) => {
                current.upsert(entry)?;
            }
            None => {
                if current.remove(leaf_id).is_none() {
                    return Err(ClientError::InvalidPath(format!(
                        "{} does not exist",
                        path.join("/")
                    )));
                }
            }
        }

        let mut hash = self.put_collection(&current).await?;
        for (mut parent, id) in ancestors.into_iter().rev().zip(parents.iter().rev()) {
            parent.upsert(CollectionEntry::collection(*id, &current))?;
            hash = self.put_collection(&parent).await?;
            current = parent;
        }
        Ok(hash)
    }

    /// Read the root, apply `mutation` to the top-level collection and
    /// compare-and-swap the result in.
    ///
    /// On a conflict the root is re-read and the mutation recomputed from
    /// scratch; the losing hash is never resubmitted. Gives up with
    /// [`ClientError::RetriesExhausted`] after
    /// [`ClientConfig::transact_attempts`] conflicts.
    pub async fn transact<M>(&self, mutation: &M) -> ClientResult<RootPointer>
    where
        M: RootMutation + ?Sized,
    {
        self.transact_with_attempts(mutation, self.config.transact_attempts)
            .await
    }

    /// [`transact`](Self::transact) with an explicit attempt budget.
    pub async fn transact_with_attempts<M>(
        &self,
        mutation: &M,
        attempts: u32,
    ) -> ClientResult<RootPointer>
    where
        M: RootMutation + ?Sized,
    {
        if attempts == 0 {
            return Err(ClientError::Config("transaction needs at least one attempt".into()));
        }
        for attempt in 1..=attempts {
            let root = self.get_root().await?;
            let tree = self.get_collection(&root.hash).await?;
            let new_hash = mutation.apply(self, &tree).await?;
            if new_hash == root.hash {
                debug!(hash = %root.hash, "mutation left the root unchanged");
                return Ok(root);
            }
            match self.put_root(new_hash, root.generation).await {
                Ok(generation) => {
                    info!(hash = %new_hash, generation, attempt, "transaction committed");
                    return Ok(RootPointer {
                        hash: new_hash,
                        generation,
                        schema_version: root.schema_version,
                    });
                }
                Err(e) if e.is_conflict() => {
                    debug!(attempt, attempts, "transaction conflicted, recomputing");
                }
                Err(e) => return Err(e),
            }
        }
        warn!(attempts, "transaction gave up");
        Err(ClientError::RetriesExhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::ReplaceEntry;
    use async_trait::async_trait;
    use rms_sync::{MemoryTransport, RetryPolicy, RootPutOutcome, TransportError, TransportResult};
    use rms_types::SchemaVersion;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config() -> ClientConfig {
        ClientConfig {
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay_ms: 1,
                max_delay_ms: 1,
            },
            ..ClientConfig::default()
        }
    }

    /// A store whose root is an empty top-level collection.
    fn setup() -> (Arc<MemoryTransport>, RawStoreClient) {
        let empty = Collection::empty(SchemaVersion::V3);
        let transport = Arc::new(MemoryTransport::new(empty.hash()));
        transport.insert_blob(empty.encode());
        let client = RawStoreClient::new(transport.clone(), fast_config()).unwrap();
        (transport, client)
    }

    fn metadata(name: &str, parent: &str) -> Value {
        json!({
            "visibleName": name,
            "type": "DocumentType",
            "parent": parent,
            "lastModified": "1700000000000",
        })
    }

    /// A document collection holding just its metadata blob.
    async fn put_document(client: &RawStoreClient, id: &str, meta: &Value) -> Collection {
        let meta_hash = client.put_entity(EntityKind::Metadata, meta).await.unwrap();
        let entry = CollectionEntry::file(
            format!("{id}.metadata"),
            &serde_json::to_vec(meta).unwrap(),
        );
        assert_eq!(entry.hash, meta_hash);
        let doc = Collection::new(SchemaVersion::V3, vec![entry]).unwrap();
        client.put_collection(&doc).await.unwrap();
        doc
    }

    fn place(path: &[&str], leaf: Option<CollectionEntry>) -> ReplaceEntry {
        ReplaceEntry::new(path.iter().map(|s| s.to_string()).collect(), leaf)
    }

    // ---- Blobs ----

    #[tokio::test]
    async fn blob_reads_are_cached() {
        let (transport, client) = setup();
        let hash = transport.insert_blob(&b"page one"[..]);

        assert_eq!(client.get_blob(&hash).await.unwrap(), Bytes::from_static(b"page one"));
        transport.fail_next(TransportError::Connection("down".into()));
        assert_eq!(client.get_blob(&hash).await.unwrap(), Bytes::from_static(b"page one"));

        let stats = client.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn blob_reads_survive_transient_failures() {
        let (transport, client) = setup();
        let hash = transport.insert_blob(&b"x"[..]);
        transport.fail_next(TransportError::Timeout(std::time::Duration::from_secs(1)));
        transport.fail_next(TransportError::Status {
            status: 503,
            body: String::new(),
        });
        assert!(client.get_blob(&hash).await.is_ok());
    }

    #[tokio::test]
    async fn missing_blob_is_not_retried() {
        let (transport, client) = setup();
        let hash = Hash::from_digest([7; 32]);
        transport.fail_next(TransportError::NotFound(hash));
        let err = client.get_blob(&hash).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(TransportError::NotFound(h)) if h == hash));
    }

    #[tokio::test]
    async fn put_blob_returns_content_hash() {
        let (transport, client) = setup();
        let before = transport.blob_count();
        let hash = client.put_blob(&b"stroke data"[..]).await.unwrap();
        assert_eq!(hash, ContentHasher::hash(b"stroke data"));
        assert_eq!(transport.blob_count(), before + 1);
        assert_eq!(client.cache_stats().misses, 0);
        client.get_blob(&hash).await.unwrap();
        assert_eq!(client.cache_stats().hits, 1);
    }

    /// Serves one fixed body for every blob.
    struct LyingTransport;

    #[async_trait]
    impl StoreTransport for LyingTransport {
        async fn get_root(&self) -> TransportResult<Vec<u8>> {
            Err(TransportError::Connection("unused".into()))
        }

        async fn put_root(&self, _body: Vec<u8>) -> TransportResult<RootPutOutcome> {
            Ok(RootPutOutcome::Conflict)
        }

        async fn get_blob(&self, _hash: &Hash) -> TransportResult<Bytes> {
            Ok(Bytes::from_static(b"not what you asked for"))
        }

        async fn put_blob(&self, _hash: &Hash, _data: Bytes) -> TransportResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn wrong_content_is_rejected_and_not_cached() {
        let client = RawStoreClient::new(Arc::new(LyingTransport), fast_config()).unwrap();
        let hash = Hash::from_digest([3; 32]);
        let err = client.get_blob(&hash).await.unwrap_err();
        assert!(matches!(err, ClientError::HashMismatch { expected, .. } if expected == hash));
        assert!(client.get_blob(&hash).await.is_err());
        assert_eq!(client.cache_stats().hits, 0);
    }

    #[tokio::test]
    async fn shared_cache_serves_both_clients() {
        let (transport, first) = setup();
        let cache = Arc::new(BlobCache::new(8).unwrap());
        let first = first.with_validator(Arc::new(SchemaValidator::new().unwrap()));
        let a = RawStoreClient::with_cache(transport.clone(), cache.clone(), fast_config()).unwrap();
        let b = RawStoreClient::with_cache(transport.clone(), cache.clone(), fast_config()).unwrap();
        let hash = a.put_blob(&b"shared"[..]).await.unwrap();
        transport.fail_next(TransportError::Connection("down".into()));
        assert!(b.get_blob(&hash).await.is_ok());
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(first.cache_stats().hits, 0);
    }

    // ---- Entities ----

    #[tokio::test]
    async fn put_entity_refuses_invalid_payloads() {
        let (transport, client) = setup();
        let before = transport.blob_count();
        let mut meta = metadata("Notes", "");
        meta.as_object_mut().unwrap().remove("visibleName");

        let err = client.put_entity(EntityKind::Metadata, &meta).await.unwrap_err();
        match err {
            ClientError::Validation(e) => assert!(e.mentions_path("/visibleName")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(transport.blob_count(), before);
    }

    #[tokio::test]
    async fn entity_round_trip_with_widened_fields() {
        let (_, client) = setup();
        let mut meta = metadata("Notes", "trash");
        meta["lastOpenedPage"] = json!(-1);
        let hash = client.put_entity(EntityKind::Metadata, &meta).await.unwrap();

        let entity = client.get_metadata(&hash).await.unwrap();
        assert_eq!(entity.kind, EntityKind::Metadata);
        assert_eq!(entity.value, meta);
    }

    #[tokio::test]
    async fn content_kind_follows_metadata_type() {
        let (_, client) = setup();
        let folder_meta = json!({
            "visibleName": "Work",
            "type": "CollectionType",
            "parent": "",
            "lastModified": "1",
        });
        let meta_hash = client.put_entity(EntityKind::Metadata, &folder_meta).await.unwrap();
        let content_hash = client
            .put_entity(EntityKind::CollectionContent, &json!({"tags": []}))
            .await
            .unwrap();

        let meta = client.get_metadata(&meta_hash).await.unwrap();
        let content = client.get_content(&content_hash, &meta).await.unwrap();
        assert_eq!(content.kind, EntityKind::CollectionContent);
    }

    #[tokio::test]
    async fn non_json_blob_is_invalid_json() {
        let (_, client) = setup();
        let hash = client.put_blob(&b"\x00\x01 not json"[..]).await.unwrap();
        let err = client.get_entity(&hash, EntityKind::Any).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidJson { hash: h, .. } if h == hash));
    }

    // ---- Tree edits ----

    #[tokio::test]
    async fn replace_at_path_rejects_bad_paths() {
        let (_, client) = setup();
        let root = Collection::empty(SchemaVersion::V3);
        let leaf = CollectionEntry::file("a", b"1");

        let err = client.replace_at_path(&root, &[], None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidPath(_)));
        let err = client
            .replace_at_path(&root, &["b"], Some(leaf.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidPath(_)));
        let err = client
            .replace_at_path(&root, &["missing", "a"], Some(leaf))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidPath(_)));
        let err = client.replace_at_path(&root, &["a"], None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn replace_at_path_removes_entries() {
        let (_, client) = setup();
        let root = Collection::new(
            SchemaVersion::V3,
            vec![CollectionEntry::file("a", b"1"), CollectionEntry::file("b", b"2")],
        )
        .unwrap();
        let hash = client.replace_at_path(&root, &["a"], None).await.unwrap();
        let after = client.get_collection(&hash).await.unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after.get("b"), root.get("b"));
    }

    // ---- Transactions ----

    #[tokio::test]
    async fn end_to_end_add_and_rename() {
        let (transport, client) = setup();

        // R0 holds one empty folder F0.
        let f0 = Collection::empty(SchemaVersion::V3);
        let f0_hash = client.put_collection(&f0).await.unwrap();
        let start = client.get_root().await.unwrap();
        let mut r0 = client.get_collection(&start.hash).await.unwrap();
        r0.upsert(CollectionEntry::collection("folder", &f0)).unwrap();
        let r0_hash = client.put_collection(&r0).await.unwrap();
        let g0 = client.put_root(r0_hash, start.generation).await.unwrap();

        // Adding a document: F0 -> F1, R0 -> R1, generation + 1.
        let doc = put_document(&client, "doc", &metadata("Notes", "folder")).await;
        let r1 = client
            .transact_with_attempts(
                &place(&["folder", "doc"], Some(CollectionEntry::collection("doc", &doc))),
                3,
            )
            .await
            .unwrap();
        assert_eq!(r1.generation, g0 + 1);
        assert_ne!(r1.hash, r0_hash);
        assert_eq!(transport.root(), (r1.hash, r1.generation));

        let top = client.get_collection(&r1.hash).await.unwrap();
        let f1_hash = top.get("folder").unwrap().hash;
        assert_ne!(f1_hash, f0_hash);
        let f1 = client.get_collection(&f1_hash).await.unwrap();
        assert_eq!(f1.get("doc").unwrap().hash, doc.hash());

        // A sibling, so the rename below has something to leave alone.
        let other = put_document(&client, "other", &metadata("Other", "folder")).await;
        let r2 = client
            .transact_with_attempts(
                &place(&["folder", "other"], Some(CollectionEntry::collection("other", &other))),
                3,
            )
            .await
            .unwrap();
        let f2_hash = client.get_collection(&r2.hash).await.unwrap().get("folder").unwrap().hash;
        let f2 = client.get_collection(&f2_hash).await.unwrap();

        // Renaming changes the document's hash and only its entry in F.
        let renamed = put_document(&client, "doc", &metadata("Renamed", "folder")).await;
        assert_ne!(renamed.hash(), doc.hash());
        let r3 = client
            .transact_with_attempts(
                &place(&["folder", "doc"], Some(CollectionEntry::collection("doc", &renamed))),
                3,
            )
            .await
            .unwrap();
        assert_eq!(r3.generation, r2.generation + 1);
        let f3_hash = client.get_collection(&r3.hash).await.unwrap().get("folder").unwrap().hash;
        let f3 = client.get_collection(&f3_hash).await.unwrap();
        assert_eq!(f3.len(), f2.len());
        assert_eq!(f3.get("other"), f2.get("other"));
        assert_ne!(f3.get("doc").unwrap().hash, f2.get("doc").unwrap().hash);

        let meta_hash = client.list_entries(&f3.get("doc").unwrap().hash).await.unwrap()[0].hash;
        let meta = client.get_metadata(&meta_hash).await.unwrap();
        assert_eq!(meta.value["visibleName"], "Renamed");
    }

    /// Moves the root underneath the first `races` applications.
    struct Contended {
        transport: Arc<MemoryTransport>,
        races: u32,
        calls: AtomicU32,
        inner: ReplaceEntry,
    }

    #[async_trait]
    impl RootMutation for Contended {
        async fn apply(&self, client: &RawStoreClient, root: &Collection) -> ClientResult<Hash> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.races {
                self.transport.advance_root(root.hash());
            }
            self.inner.apply(client, root).await
        }
    }

    fn contended(transport: &Arc<MemoryTransport>, races: u32) -> Contended {
        Contended {
            transport: transport.clone(),
            races,
            calls: AtomicU32::new(0),
            inner: place(&["a"], Some(CollectionEntry::file("a", b"1"))),
        }
    }

    #[tokio::test]
    async fn transact_recomputes_after_conflict() {
        let (transport, client) = setup();
        let mutation = contended(&transport, 1);
        let committed = client.transact_with_attempts(&mutation, 3).await.unwrap();
        assert_eq!(mutation.calls.load(Ordering::SeqCst), 2);
        // Generation 0, bumped once by the rival and once by us.
        assert_eq!(committed.generation, 2);
        assert_eq!(transport.root(), (committed.hash, 2));
    }

    #[tokio::test]
    async fn transact_gives_up_after_budget() {
        let (transport, client) = setup();
        let mutation = contended(&transport, u32::MAX);
        let err = client.transact_with_attempts(&mutation, 3).await.unwrap_err();
        assert!(matches!(err, ClientError::RetriesExhausted { attempts: 3 }));
        assert_eq!(mutation.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn transact_uses_configured_budget() {
        let empty = Collection::empty(SchemaVersion::V3);
        let transport = Arc::new(MemoryTransport::new(empty.hash()));
        transport.insert_blob(empty.encode());
        let config = ClientConfig {
            transact_attempts: 2,
            ..fast_config()
        };
        let client = RawStoreClient::new(transport.clone(), config).unwrap();

        let mutation = contended(&transport, u32::MAX);
        let err = client.transact(&mutation).await.unwrap_err();
        assert!(matches!(err, ClientError::RetriesExhausted { attempts: 2 }));
        assert_eq!(mutation.calls.load(Ordering::SeqCst), 2);

        let committed = client.transact(&contended(&transport, 1)).await.unwrap();
        assert_eq!(transport.root(), (committed.hash, committed.generation));
    }

    #[tokio::test]
    async fn no_op_mutation_does_not_write() {
        let (transport, client) = setup();
        let before = transport.root();
        let root = client
            .transact_with_attempts(&place(&["a"], Some(CollectionEntry::file("a", b"1"))), 1)
            .await
            .unwrap();
        let again = client
            .transact_with_attempts(&place(&["a"], Some(CollectionEntry::file("a", b"1"))), 1)
            .await
            .unwrap();
        assert_eq!(root.generation, before.1 + 1);
        assert_eq!(again, root);
        let zero = client.transact_with_attempts(&contended(&transport, 0), 0).await;
        assert!(matches!(zero, Err(ClientError::Config(_))));
    }
}
