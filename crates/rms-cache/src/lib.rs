//! Bounded least-recently-used memoization.
//!
//! Keys handed to this cache are content hashes and values are immutable, so
//! there is no invalidation path other than eviction under capacity pressure.
//! The cache is an ordinary owned value: construct one, wrap it in an `Arc`,
//! and hand it to whichever client needs it.

pub mod error;
pub mod lru_cache;

pub use error::CacheError;
pub use lru_cache::{CacheStats, LruCache};
