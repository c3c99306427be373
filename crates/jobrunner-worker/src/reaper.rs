//! Crash recovery: returns orphaned in-flight ids to their ready lists.

use jobrunner_queue::PriorityQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Ids moved per lane per tick.
const BATCH_PER_LANE: usize = 100;

/// Periodic task that requeues stale in-flight ids.
///
/// There is no per-id lease: anything still in an in-flight list at tick
/// time is treated as stale, so the interval is also the redelivery latency
/// floor for crashed workers.
pub struct Reaper {
    queue: Arc<PriorityQueue>,
    interval: Duration,
}

impl Reaper {
    pub fn new(queue: Arc<PriorityQueue>) -> Self {
        Self {
            queue,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Tick until `shutdown` is cancelled. Errors are logged and the next
    /// tick proceeds.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match self.queue.requeue_stale(BATCH_PER_LANE).await {
                        Ok(0) => {}
                        Ok(moved) => info!(moved, "Requeued stale in-flight jobs"),
                        Err(err) => warn!(error = %err, "Requeue failed"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobrunner_queue::{MemoryLaneStore, QueueKeys};
    use tokio::time::sleep;

    #[tokio::test]
    async fn reaper_restores_unacked_claims() {
        let store = Arc::new(MemoryLaneStore::new());
        let queue = Arc::new(PriorityQueue::new(store.clone(), QueueKeys::default()));

        queue.enqueue("X", 1).await.unwrap();
        queue
            .claim_blocking(Some(Duration::from_secs(1)))
            .await
            .unwrap();

        let reaper = Reaper::new(queue.clone()).with_interval(Duration::from_millis(50));
        let shutdown = CancellationToken::new();
        let running = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { reaper.run(shutdown).await }
        });

        sleep(Duration::from_millis(200)).await;
        shutdown.cancel();
        running.await.unwrap();

        assert_eq!(store.snapshot("jobs:queue:normal"), vec!["X"]);
        assert!(store.snapshot("jobs:processing:normal").is_empty());
    }
}
