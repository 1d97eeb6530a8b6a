use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::error::CacheError;

/// Hit/miss/eviction counters for a cache instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct Inner<K: Hash + Eq, V> {
    entries: lru::LruCache<K, V>,
    stats: CacheStats,
}

/// A thread-safe, fixed-capacity LRU cache.
///
/// Every operation takes the internal mutex for its full duration and never
/// awaits while holding it, so overlapping async calls cannot interleave in
/// the middle of a recency update. Values are cloned out on read; store
/// `Arc`s or `bytes::Bytes` for large payloads.
pub struct LruCache<K: Hash + Eq, V> {
    inner: Mutex<Inner<K, V>>,
    capacity: NonZeroUsize,
}

impl<K: Hash + Eq, V: Clone> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        let capacity = NonZeroUsize::new(capacity).ok_or(CacheError::ZeroCapacity)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                entries: lru::LruCache::new(capacity),
                stats: CacheStats::default(),
            }),
            capacity,
        })
    }

    // A panic while holding the lock cannot leave the lru list half-linked:
    // every mutation below is a single call into `lru`.
    fn lock(&self) -> MutexGuard<'_, Inner<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, marking it most-recently-used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.lock();
        match inner.entries.get(key).cloned() {
            Some(value) => {
                inner.stats.hits += 1;
                Some(value)
            }
            None => {
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite `key`, marking it most-recently-used.
    ///
    /// Returns the least-recently-used entry if the insert pushed the cache
    /// over capacity. Overwriting an existing key never evicts.
    pub fn set(&self, key: K, value: V) -> Option<(K, V)> {
        let mut inner = self.lock();
        if inner.entries.contains(&key) {
            inner.entries.put(key, value);
            return None;
        }
        let evicted = inner.entries.push(key, value);
        if evicted.is_some() {
            inner.stats.evictions += 1;
            trace!(len = inner.entries.len(), "evicted least-recently-used entry");
        }
        evicted
    }

    /// Whether `key` is cached. Does not affect recency.
    pub fn has(&self, key: &K) -> bool {
        self.lock().entries.contains(key)
    }

    /// Remove `key` unconditionally, returning its value if it was present.
    pub fn delete(&self, key: &K) -> Option<V> {
        self.lock().entries.pop(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Snapshot of the hit/miss/eviction counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }
}

impl<K: Hash + Eq, V> std::fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("LruCache")
            .field("len", &inner.entries.len())
            .field("capacity", &self.capacity)
            .field("stats", &inner.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cache(capacity: usize) -> LruCache<&'static str, u32> {
        LruCache::new(capacity).unwrap()
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            LruCache::<u8, u8>::new(0).unwrap_err(),
            CacheError::ZeroCapacity
        );
    }

    #[test]
    fn insert_past_capacity_evicts_oldest() {
        let c = cache(2);
        assert!(c.set("a", 1).is_none());
        assert!(c.set("b", 2).is_none());
        assert_eq!(c.set("c", 3), Some(("a", 1)));
        assert!(!c.has(&"a"));
        assert!(c.has(&"b"));
        assert!(c.has(&"c"));
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn get_protects_from_eviction() {
        let c = cache(2);
        c.set("a", 1);
        c.set("b", 2);
        assert_eq!(c.get(&"a"), Some(1));
        assert_eq!(c.set("c", 3), Some(("b", 2)));
        assert!(c.has(&"a"));
        assert!(!c.has(&"b"));
    }

    #[test]
    fn has_does_not_touch_recency() {
        let c = cache(2);
        c.set("a", 1);
        c.set("b", 2);
        assert!(c.has(&"a"));
        assert_eq!(c.set("c", 3), Some(("a", 1)));
    }

    #[test]
    fn overwrite_refreshes_without_evicting() {
        let c = cache(2);
        c.set("a", 1);
        c.set("b", 2);
        assert!(c.set("a", 10).is_none());
        assert_eq!(c.len(), 2);
        assert_eq!(c.set("c", 3), Some(("b", 2)));
        assert_eq!(c.get(&"a"), Some(10));
    }

    #[test]
    fn delete_removes_unconditionally() {
        let c = cache(2);
        c.set("a", 1);
        assert_eq!(c.delete(&"a"), Some(1));
        assert_eq!(c.delete(&"a"), None);
        assert!(c.is_empty());
    }

    #[test]
    fn stats_track_hits_misses_evictions() {
        let c = cache(1);
        c.set("a", 1);
        c.get(&"a");
        c.get(&"zzz");
        c.set("b", 2);
        assert_eq!(
            c.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                evictions: 1
            }
        );
    }

    #[test]
    fn clear_keeps_capacity() {
        let c = cache(3);
        c.set("a", 1);
        c.set("b", 2);
        c.clear();
        assert!(c.is_empty());
        assert_eq!(c.capacity(), 3);
    }

    #[test]
    fn concurrent_access_respects_capacity() {
        use std::thread;

        let c = Arc::new(LruCache::<u32, u32>::new(16).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let c = Arc::clone(&c);
                thread::spawn(move || {
                    for i in 0..200 {
                        let key = t * 1000 + i;
                        c.set(key, i);
                        c.get(&key);
                        assert!(c.len() <= 16);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(c.len(), 16);
        assert_eq!(c.stats().evictions, 8 * 200 - 16);
    }

    #[tokio::test]
    async fn overlapping_tasks_share_one_cache() {
        let c = Arc::new(LruCache::<u32, String>::new(4).unwrap());
        let mut tasks = Vec::new();
        for i in 0..32u32 {
            let c = Arc::clone(&c);
            tasks.push(tokio::spawn(async move {
                c.set(i % 4, format!("v{}", i % 4));
                tokio::task::yield_now().await;
                c.get(&(i % 4))
            }));
        }
        for task in tasks {
            let value = task.await.unwrap();
            assert!(value.is_some());
        }
        assert_eq!(c.len(), 4);
    }
}
