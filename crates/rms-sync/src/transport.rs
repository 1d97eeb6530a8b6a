use async_trait::async_trait;
use bytes::Bytes;
use rms_types::Hash;

use crate::error::TransportResult;

/// Server answer to a conditional root write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RootPutOutcome {
    /// The generation matched; body is the server's JSON reply.
    Accepted(Vec<u8>),
    /// The generation did not match; nothing was written.
    Conflict,
}

/// Network seam to the remote store.
///
/// Bodies are opaque bytes here: parsing and validation happen above this
/// trait. Implementations own timeouts, cancellation and authentication and
/// report failures as the matching [`TransportError`](crate::TransportError)
/// variant without reinterpreting them.
#[async_trait]
pub trait StoreTransport: Send + Sync {
    /// `GET` the root pointer. Returns the JSON body.
    async fn get_root(&self) -> TransportResult<Vec<u8>>;

    /// `PUT` a root update (JSON body) with compare-and-swap semantics.
    async fn put_root(&self, body: Vec<u8>) -> TransportResult<RootPutOutcome>;

    /// `GET` a blob by hash.
    async fn get_blob(&self, hash: &Hash) -> TransportResult<Bytes>;

    /// `PUT` a blob under its hash. Re-uploading an existing blob is a no-op.
    async fn put_blob(&self, hash: &Hash, data: Bytes) -> TransportResult<()>;
}
