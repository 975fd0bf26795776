use std::sync::Arc;
use std::time::Duration;

use burnbox_storage::InMemoryStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodically drops expired entries from an in-memory store.
///
/// Reads already ignore expired entries; this only reclaims memory.
pub fn spawn_sweeper(store: Arc<InMemoryStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick fires immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = store.purge_expired();
            if purged > 0 {
                tracing::debug!(purged, remaining = store.len(), "swept expired pastes");
            }
        }
    })
}
