//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{parse_size, CacheConfig, DEFAULT_MAX_MEMORY};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Memory ceiling in bytes
    pub max_memory: u64,
    /// Default TTL in seconds for entries without explicit TTL, 0 = never expire
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background sweep interval in seconds
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_MEMORY` - Memory ceiling as a size spec, e.g. `512MB` (default: 100MB)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 = never (default: 0)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `SWEEP_INTERVAL` - Expiry sweep frequency in seconds (default: 10)
    pub fn from_env() -> Self {
        Self {
            max_memory: env::var("MAX_MEMORY")
                .ok()
                .and_then(|v| parse_size(&v))
                .unwrap_or(DEFAULT_MAX_MEMORY),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            sweep_interval: env::var("SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(10),
        }
    }

    /// Engine parameters derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_memory: self.max_memory,
            sweep_interval: Duration::from_secs(self.sweep_interval),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_memory: DEFAULT_MAX_MEMORY,
            default_ttl: 0,
            server_port: 3000,
            sweep_interval: 10,
        }
    }
}
