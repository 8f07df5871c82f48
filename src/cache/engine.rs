//! Memory Cache Engine
//!
//! Shared handle bundling a [`CacheStore`] with the background sweeper that
//! owns its expiry loop.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::{CacheConfig, CacheStats, CacheStore, SizeEstimate};
use crate::error::Result;
use crate::tasks::spawn_sweeper;

struct Inner<V> {
    store: Arc<CacheStore<V>>,
    shutdown_tx: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<V> Drop for Inner<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

// == Memory Cache ==
/// Cloneable cache handle with a running expiry sweeper.
///
/// All clones share one table. The sweeper is stopped by [`shutdown`](Self::shutdown)
/// or aborted when the last clone is dropped.
pub struct MemoryCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> MemoryCache<V>
where
    V: SizeEstimate + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache and starts its sweeper.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn new(config: CacheConfig) -> Self {
        Self::from_store(CacheStore::new(config.max_memory), config.sweep_interval)
    }
}

impl<V> MemoryCache<V>
where
    V: Send + Sync + 'static,
{
    /// Creates a cache sized by a caller-supplied estimator and starts its sweeper.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime.
    pub fn with_estimator<F>(config: CacheConfig, estimator: F) -> Self
    where
        F: Fn(&V) -> u64 + Send + Sync + 'static,
    {
        Self::from_store(
            CacheStore::with_estimator(config.max_memory, estimator),
            config.sweep_interval,
        )
    }

    fn from_store(store: CacheStore<V>, sweep_interval: Duration) -> Self {
        let store = Arc::new(store);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_sweeper(Arc::clone(&store), sweep_interval, shutdown_rx);

        info!(
            "Memory cache initialized (max_memory: {} bytes)",
            store.max_memory()
        );

        Self {
            inner: Arc::new(Inner {
                store,
                shutdown_tx,
                sweeper: Mutex::new(Some(handle)),
            }),
        }
    }

    // == Shutdown ==
    /// Signals the sweeper to stop and waits for it to finish.
    ///
    /// The table stays usable afterwards; only proactive expiry stops.
    /// Calling this more than once is harmless.
    pub async fn shutdown(&self) {
        let _ = self.inner.shutdown_tx.send(true);

        let handle = self.inner.sweeper.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Expiry sweeper ended abnormally: {}", e);
            }
        }
    }

    /// Returns true while the sweeper task is running.
    pub fn is_sweeping(&self) -> bool {
        self.inner
            .sweeper
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// See [`CacheStore::set_max_memory`].
    pub fn set_max_memory(&self, spec: &str) -> (u64, bool) {
        self.inner.store.set_max_memory(spec)
    }

    /// See [`CacheStore::set_max_memory_bytes`].
    pub fn set_max_memory_bytes(&self, bytes: u64) -> u64 {
        self.inner.store.set_max_memory_bytes(bytes)
    }

    /// See [`CacheStore::set`].
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        self.inner.store.set(key, value, ttl)
    }

    pub fn delete(&self, key: &str) -> bool {
        self.inner.store.delete(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        self.inner.store.exists(key)
    }

    pub fn flush(&self) -> usize {
        self.inner.store.flush()
    }

    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    pub fn current_size(&self) -> u64 {
        self.inner.store.current_size()
    }

    pub fn max_memory(&self) -> u64 {
        self.inner.store.max_memory()
    }

    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        self.inner.store.ttl_remaining(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.store.stats()
    }
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// See [`CacheStore::get`].
    pub fn get(&self, key: &str) -> Option<V> {
        self.inner.store.get(key)
    }
}

impl<V> fmt::Debug for MemoryCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCache")
            .field("store", &self.inner.store)
            .finish()
    }
}
