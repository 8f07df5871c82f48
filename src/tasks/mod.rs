//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a cache.
//!
//! # Tasks
//! - Expiry sweeper: Removes expired cache entries at a fixed interval

mod sweeper;

pub use sweeper::spawn_sweeper;
