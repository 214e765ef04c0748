//! TTL Eviction Task
//!
//! Background task that periodically removes expired entries from a
//! [`TtlStore`](crate::cache::TtlStore).

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::StoreInner;

/// Spawns the sweep loop for a store.
///
/// Every `interval` the task upgrades its weak reference and calls
/// `delete_expired`. It exits when `token` is cancelled or when the store has
/// been dropped, and marks the sweep as stopped on the way out.
pub(crate) fn spawn_eviction_task<V>(
    store: Weak<StoreInner<V>>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "Starting TTL eviction task"
        );

        // First sweep one full interval after start
        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("TTL eviction task received stop signal");
                    break;
                }
                _ = ticker.tick() => {
                    let Some(inner) = store.upgrade() else {
                        debug!("Store dropped, ending TTL eviction task");
                        break;
                    };

                    let removed = inner.delete_expired().await;
                    if removed > 0 {
                        info!(removed, "TTL eviction: removed expired entries");
                    } else {
                        debug!("TTL eviction: no expired entries found");
                    }
                }
            }
        }

        if let Some(inner) = store.upgrade() {
            inner.mark_sweep_stopped();
        }
        info!("TTL eviction task stopped");
    })
}
