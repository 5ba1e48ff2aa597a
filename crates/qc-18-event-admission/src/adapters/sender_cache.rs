//! LRU cache of recovered transaction senders
//!
//! Filled by the heavy check, read again by execution so each signature is
//! recovered once.

use lru::LruCache;
use parking_lot::Mutex;
use shared_types::{Address, Hash};
use std::num::NonZeroUsize;

/// Default number of cached senders.
pub const DEFAULT_SENDER_CACHE_SIZE: usize = 16_384;

/// Thread-safe tx hash -> sender cache.
pub struct SenderCache {
    inner: Mutex<LruCache<Hash, Address>>,
}

impl SenderCache {
    /// Create with a capacity (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cached sender of a transaction.
    pub fn get(&self, tx_hash: &Hash) -> Option<Address> {
        self.inner.lock().get(tx_hash).copied()
    }

    /// Remember a recovered sender.
    pub fn insert(&self, tx_hash: Hash, sender: Address) {
        self.inner.lock().put(tx_hash, sender);
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_SENDER_CACHE_SIZE)
    }
}
