//! Cache Store Module
//!
//! Main cache engine: a HashMap of entries and its running size counter,
//! guarded together by one reader/writer lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::cache::size::{parse_size, SizeEstimate};
use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats, DEFAULT_MAX_MEMORY};
use crate::error::{CacheError, Result};

/// Pluggable size estimator for values of type `V`.
pub type Estimator<V> = Arc<dyn Fn(&V) -> u64 + Send + Sync>;

// == Table ==
/// Entries plus the sum of their sizes; only ever touched under the store lock.
struct Table<V> {
    entries: HashMap<String, CacheEntry<V>>,
    current_size: u64,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            current_size: 0,
        }
    }
}

impl<V> Table<V> {
    fn insert(&mut self, key: String, entry: CacheEntry<V>) {
        self.current_size += entry.size;
        if let Some(old) = self.entries.insert(key, entry) {
            self.current_size -= old.size;
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.current_size -= entry.size;
        Some(entry)
    }

    fn is_expired(&self, key: &str, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now))
    }
}

// == Cache Store ==
/// Thread-safe cache storage with TTL support and a soft memory ceiling.
///
/// Every method takes `&self`; share it behind an `Arc` across threads.
pub struct CacheStore<V> {
    /// Key-value storage and size counter
    table: RwLock<Table<V>>,
    /// Memory ceiling in bytes, gates future writes only
    max_memory: AtomicU64,
    /// Computes each value's footprint at insertion time
    estimator: Estimator<V>,
    /// Performance statistics
    stats: StatsCounters,
}

impl<V: SizeEstimate> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore sized by the value's [`SizeEstimate`] impl.
    ///
    /// # Arguments
    /// * `max_memory` - Ceiling in bytes, 0 selects the 100 MB default
    pub fn new(max_memory: u64) -> Self {
        Self::with_estimator(max_memory, |value: &V| value.estimated_size())
    }
}

impl<V> CacheStore<V> {
    /// Creates a new CacheStore with a caller-supplied size estimator.
    pub fn with_estimator<F>(max_memory: u64, estimator: F) -> Self
    where
        F: Fn(&V) -> u64 + Send + Sync + 'static,
    {
        Self {
            table: RwLock::new(Table::default()),
            max_memory: AtomicU64::new(effective_ceiling(max_memory)),
            estimator: Arc::new(estimator),
            stats: StatsCounters::default(),
        }
    }

    // == Set Max Memory ==
    /// Parses a size specification such as `"512MB"` and applies it as the ceiling.
    ///
    /// Falls back to the 100 MB default when the specification is not understood.
    /// Existing entries are never evicted, even if they already exceed the new ceiling.
    ///
    /// Returns the ceiling now in effect and whether `spec` was understood.
    pub fn set_max_memory(&self, spec: &str) -> (u64, bool) {
        let parsed = parse_size(spec);
        if parsed.is_none() {
            warn!(
                "Unrecognized memory size '{}', using default of {} bytes",
                spec, DEFAULT_MAX_MEMORY
            );
        }
        let bytes = self.set_max_memory_bytes(parsed.unwrap_or(DEFAULT_MAX_MEMORY));
        (bytes, parsed.is_some())
    }

    /// Applies a ceiling in bytes; 0 selects the default.
    pub fn set_max_memory_bytes(&self, bytes: u64) -> u64 {
        let bytes = effective_ceiling(bytes);
        self.max_memory.store(bytes, Ordering::Relaxed);
        info!("Memory ceiling set to {} bytes", bytes);
        bytes
    }

    // == Set ==
    /// Stores a key-value pair, replacing any previous entry for `key`.
    ///
    /// Any previous entry for `key` is taken out first and the new total checked
    /// against the ceiling. When the ceiling would be exceeded, or the total does
    /// not fit in a `u64`, the previous entry is put back and
    /// [`CacheError::MemoryOverflow`] is returned.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Time-to-live, `Duration::ZERO` for a permanent entry
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        let key = key.into();
        let size = (self.estimator)(&value);
        let max_memory = self.max_memory();

        let mut table = self.table.write();
        let previous = table.remove(&key);
        let fits = table
            .current_size
            .checked_add(size)
            .is_some_and(|total| total <= max_memory);

        if !fits {
            if let Some(previous) = previous {
                table.insert(key.clone(), previous);
            }
            drop(table);

            self.stats.record_rejection();
            warn!(
                "Rejected write for key '{}': {} bytes would exceed ceiling of {} bytes",
                key, size, max_memory
            );
            return Err(CacheError::MemoryOverflow {
                key,
                size,
                max_memory,
            });
        }

        table.insert(key, CacheEntry::new(value, ttl, size));
        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Returns `true` if an entry was present. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) -> bool {
        self.table.write().remove(key).is_some()
    }

    // == Exists ==
    /// Reports whether `key` is present in the table.
    ///
    /// Expiry is not checked: an expired entry that has not yet been read or
    /// swept still counts as present.
    pub fn exists(&self, key: &str) -> bool {
        self.table.read().entries.contains_key(key)
    }

    // == Flush ==
    /// Drops every entry and resets the size counter.
    ///
    /// Returns the number of entries removed.
    pub fn flush(&self) -> usize {
        let old = std::mem::take(&mut *self.table.write());
        old.entries.len()
    }

    // == Length ==
    /// Returns the number of entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.table.read().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.table.read().entries.is_empty()
    }

    /// Estimated bytes held by all entries.
    pub fn current_size(&self) -> u64 {
        self.table.read().current_size
    }

    /// Memory ceiling currently in effect.
    pub fn max_memory(&self) -> u64 {
        self.max_memory.load(Ordering::Relaxed)
    }

    // == TTL ==
    /// Remaining time-to-live for `key`.
    ///
    /// # Returns
    /// - `None` if the key is absent or expired
    /// - `Some(None)` if the entry never expires
    /// - `Some(Some(remaining))` otherwise
    pub fn ttl_remaining(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        let table = self.table.read();
        table
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(CacheEntry::ttl_remaining)
    }

    // == Remove Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Candidates are collected under the read lock; each is then removed
    /// under its own write lock after re-checking that it is still expired.
    ///
    /// Returns the number of entries removed.
    pub fn remove_expired(&self) -> usize {
        self.remove_expired_at(Instant::now())
    }

    /// Removes entries that were already expired at `now`.
    pub fn remove_expired_at(&self, now: Instant) -> usize {
        let expired_keys: Vec<String> = self
            .table
            .read()
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        expired_keys
            .iter()
            .filter(|key| self.remove_if_expired(key, now))
            .count()
    }

    /// Removes `key` under the write lock if it is still expired at `now`.
    fn remove_if_expired(&self, key: &str, now: Instant) -> bool {
        let mut table = self.table.write();
        // May have been overwritten since the caller looked.
        if !table.is_expired(key, now) {
            return false;
        }
        table.remove(key);
        drop(table);

        self.stats.record_expiration();
        true
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total_entries, current_size) = {
            let table = self.table.read();
            (table.entries.len(), table.current_size)
        };
        self.stats
            .snapshot(total_entries, current_size, self.max_memory())
    }
}

impl<V: Clone> CacheStore<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An expired entry is removed on discovery and reported as absent; the
    /// read lock is released and the write lock taken before removing it.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let table = self.table.read();
            match table.entries.get(key) {
                None => {
                    self.stats.record_miss();
                    return None;
                }
                Some(entry) if !entry.is_expired_at(now) => {
                    self.stats.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        self.remove_if_expired(key, now);
        self.stats.record_miss();
        None
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.read();
        f.debug_struct("CacheStore")
            .field("entries", &table.entries.len())
            .field("current_size", &table.current_size)
            .field("max_memory", &self.max_memory())
            .finish()
    }
}

fn effective_ceiling(bytes: u64) -> u64 {
    if bytes == 0 {
        DEFAULT_MAX_MEMORY
    } else {
        bytes
    }
}
