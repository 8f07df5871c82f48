//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{CacheStore, DEFAULT_SWEEP_INTERVAL};

/// Spawns a background task that periodically removes expired cache entries.
///
/// The first sweep runs one full interval after spawning. Each removal takes
/// the store's write lock on its own, so readers interleave with a sweep pass.
///
/// The task exits when `true` is published on `shutdown` or when the sender
/// is dropped. It can also be stopped with [`JoinHandle::abort`].
///
/// # Arguments
/// * `store` - Shared reference to the cache store
/// * `interval` - Time between sweeps; zero selects the 10 second default
/// * `shutdown` - Receiver for the stop signal
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::<String>::new(0));
/// let (tx, rx) = watch::channel(false);
/// let handle = spawn_sweeper(store.clone(), Duration::from_secs(10), rx);
/// // Later, during shutdown:
/// tx.send(true).ok();
/// handle.await.ok();
/// ```
pub fn spawn_sweeper<V>(
    store: Arc<CacheStore<V>>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    let interval = if interval.is_zero() {
        DEFAULT_SWEEP_INTERVAL
    } else {
        interval
    };

    tokio::spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", interval);

        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.remove_expired();
                    if removed > 0 {
                        info!("Expiry sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Expiry sweep: no expired entries found");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    })
}
