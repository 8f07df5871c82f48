//! Cache Facade
//!
//! Boolean-returning convenience surface over [`MemoryCache`].

use std::time::Duration;

use crate::cache::{CacheConfig, MemoryCache, SizeEstimate};

// == Cache ==
/// Thin wrapper that forwards to a [`MemoryCache`] and supplies a default TTL.
#[derive(Debug, Clone)]
pub struct Cache<V> {
    engine: MemoryCache<V>,
    default_ttl: Duration,
}

impl<V> Cache<V>
where
    V: SizeEstimate + Clone + Send + Sync + 'static,
{
    /// Creates a cache whose entries never expire unless a TTL is given.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn new(config: CacheConfig) -> Self {
        Self::from_engine(MemoryCache::new(config))
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn from_engine(engine: MemoryCache<V>) -> Self {
        Self {
            engine,
            default_ttl: Duration::ZERO,
        }
    }

    /// Sets the TTL used by [`set`](Self::set).
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn engine(&self) -> &MemoryCache<V> {
        &self.engine
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Applies a size specification such as `"1KB"`.
    ///
    /// Returns `false` when the specification was not understood and the
    /// default ceiling was applied instead.
    pub fn set_max_memory(&self, spec: &str) -> bool {
        let (_, parsed) = self.engine.set_max_memory(spec);
        parsed
    }

    /// Stores `value` with the default TTL. Returns `false` if the write was rejected.
    pub fn set(&self, key: impl Into<String>, value: V) -> bool {
        self.set_with_ttl(key, value, self.default_ttl)
    }

    /// Stores `value` with an explicit TTL. Returns `false` if the write was rejected.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> bool {
        self.engine.set(key, value, ttl).is_ok()
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.engine.get(key)
    }

    /// Removes `key`. Always succeeds.
    pub fn del(&self, key: &str) -> bool {
        self.engine.delete(key);
        true
    }

    pub fn exists(&self, key: &str) -> bool {
        self.engine.exists(key)
    }

    /// Drops every entry. Always succeeds.
    pub fn flush(&self) -> bool {
        self.engine.flush();
        true
    }

    /// Number of entries, including expired ones not yet removed.
    pub fn keys(&self) -> usize {
        self.engine.len()
    }

    pub async fn shutdown(&self) {
        self.engine.shutdown().await;
    }
}
