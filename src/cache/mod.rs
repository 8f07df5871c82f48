//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and a soft memory ceiling.

mod engine;
mod entry;
mod facade;
mod size;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::time::Duration;

// Re-export public types
pub use engine::MemoryCache;
pub use entry::CacheEntry;
pub use facade::Cache;
pub use size::{parse_size, SizeEstimate, DEFAULT_FOOTPRINT};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Memory ceiling applied when none (or an unparseable one) is configured
pub const DEFAULT_MAX_MEMORY: u64 = 100 * 1024 * 1024; // 100 MB

/// Interval between background sweeps of expired entries
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

// == Cache Config ==
/// Construction parameters for a [`MemoryCache`].
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Memory ceiling in bytes, 0 selects [`DEFAULT_MAX_MEMORY`]
    pub max_memory: u64,
    /// Sweep interval, fixed for the lifetime of the cache
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
