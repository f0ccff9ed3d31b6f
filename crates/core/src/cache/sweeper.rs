//! Background sweep task.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use super::store::ResponseCache;

/// Spawn a task that sweeps `cache` every `cache.sweep_interval()`.
///
/// The first sweep happens one full interval after spawning. Abort the
/// returned handle to stop sweeping.
pub fn spawn_sweeper(cache: Arc<ResponseCache>) -> JoinHandle<()> {
    let period = cache.sweep_interval();

    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.sweep();
            tracing::info!(removed, remaining = cache.len(), "cache sweep");
        }
    })
}
