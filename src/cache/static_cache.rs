use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{CacheKey, CacheProvider};
use crate::error::Result;

/// Thread-safe in-process cache backing [`CacheProvider`].
///
/// With capacity 0 entries live for the lifetime of the process; any other
/// capacity bounds the cache with LRU eviction.
pub struct StaticCache<V> {
    entries: Mutex<LruCache<CacheKey, V>>,
}

impl<V: Clone> StaticCache<V> {
    /// Create a cache with the specified capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of entries; 0 disables eviction
    pub fn new(capacity: usize) -> Self {
        let entries = match NonZeroUsize::new(capacity) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Create a cache that never evicts
    pub fn unbounded() -> Self {
        Self::new(0)
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<CacheKey, V>> {
        // compute runs outside the lock, so a poisoned guard still holds a consistent map
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a cached value, marking it most recently used
    ///
    /// # Arguments
    ///
    /// * `key` - Namespace-qualified key to look up
    ///
    /// # Returns
    ///
    /// A clone of the stored value, or None when the key has no entry.
    /// A stored negative result (e.g. `Some(None)`) is still an entry.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries().get(key).cloned()
    }

    /// Store a value, replacing any previous entry for the key
    ///
    /// # Arguments
    ///
    /// * `key` - Namespace-qualified key
    /// * `value` - Value to cache
    pub fn insert(&self, key: CacheKey, value: V) {
        self.entries().put(key, value);
    }

    /// Get the current number of cached entries
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl<V: Clone> Default for StaticCache<V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<V: Clone + Send> CacheProvider<V> for StaticCache<V> {
    fn get_or_compute(&self, key: &CacheKey, compute: &mut dyn FnMut() -> Result<V>) -> Result<V> {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        log::debug!("Cache miss for {}", key);

        // Computed outside the lock: a slow lookup must not block other keys
        let value = compute()?;
        self.insert(key.clone(), value.clone());
        Ok(value)
    }
}
