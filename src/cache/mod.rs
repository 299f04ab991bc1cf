//! Get-or-compute caching for expensive identifier translations.
//!
//! Callers address entries with a structured [`CacheKey`] instead of an ad hoc
//! concatenated string; how a provider stores or evicts entries is its own
//! business.

pub mod static_cache;

pub use static_cache::StaticCache;

use std::fmt;

use crate::error::Result;

/// Namespace-qualified cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub namespace: String,
    pub key: String,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.namespace, self.key)
    }
}

/// A process-scoped get-or-compute cache.
///
/// `compute` runs when `key` has no entry. Its value is stored and returned;
/// an error from `compute` is returned as-is and nothing is stored, so a
/// failing collaborator is asked again on the next call. Under contention
/// `compute` may run more than once for the same key.
pub trait CacheProvider<V>: Send + Sync {
    /// Return the cached value for `key`, computing and storing it on a miss
    ///
    /// # Arguments
    ///
    /// * `key` - Namespace-qualified key
    /// * `compute` - Producer for the value when no entry exists
    ///
    /// # Returns
    ///
    /// The cached or freshly computed value; `compute`'s error on failure
    fn get_or_compute(&self, key: &CacheKey, compute: &mut dyn FnMut() -> Result<V>) -> Result<V>;
}
