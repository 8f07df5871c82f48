//! Mini Memcache - An in-process key-value cache
//!
//! Provides TTL-based expiration and an approximate total-memory budget,
//! with an optional HTTP front end.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheConfig, MemoryCache};
pub use config::Config;
pub use error::{CacheError, Result};
