//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, expirations
//! and rejected writes.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time snapshot of cache metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
    /// Number of writes refused by the memory ceiling
    pub rejected_writes: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Estimated bytes held by live entries
    pub current_size: u64,
    /// Configured memory ceiling in bytes
    pub max_memory: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Counters ==
/// Lock-free counters updated from both read and write paths.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    rejected_writes: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self) {
        self.rejected_writes.fetch_add(1, Ordering::Relaxed);
    }

    /// Builds a snapshot; table-derived fields are filled in by the caller.
    pub(crate) fn snapshot(&self, total_entries: usize, current_size: u64, max_memory: u64) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            rejected_writes: self.rejected_writes.load(Ordering::Relaxed),
            total_entries,
            current_size,
            max_memory,
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_default() {
        let stats = CacheStats::default();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.expirations, 0);
        assert_eq!(stats.rejected_writes, 0);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let counters = StatsCounters::default();
        counters.record_hit();
        counters.record_hit();
        counters.record_hit();
        counters.record_miss();

        let stats = counters.snapshot(0, 0, 0);
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_snapshot_carries_table_fields() {
        let counters = StatsCounters::default();
        counters.record_expiration();
        counters.record_rejection();
        counters.record_rejection();

        let stats = counters.snapshot(3, 120, 1024);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.rejected_writes, 2);
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.current_size, 120);
        assert_eq!(stats.max_memory, 1024);
    }
}
