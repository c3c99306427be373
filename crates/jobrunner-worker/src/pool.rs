//! Worker pool: one claim loop feeding N workers over a rendezvous channel.

use crate::processor::Processor;
use jobrunner_queue::PriorityQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long a single claim call blocks before the dispatcher re-checks for
/// shutdown.
const CLAIM_DELAY: Duration = Duration::from_secs(5);

const DEFAULT_WORKERS: usize = 4;

/// N concurrent workers fed by one claiming dispatcher.
pub struct WorkerPool {
    queue: Arc<PriorityQueue>,
    processor: Arc<Processor>,
    workers: usize,
}

impl WorkerPool {
    /// A `workers` of zero falls back to the default of four.
    pub fn new(queue: Arc<PriorityQueue>, processor: Arc<Processor>, workers: usize) -> Self {
        let workers = if workers == 0 { DEFAULT_WORKERS } else { workers };
        Self {
            queue,
            processor,
            workers,
        }
    }

    /// Run until `shutdown` is cancelled. Workers finish (and ack) the job
    /// they hold before exiting; ids claimed but unacked when the process
    /// dies are restored by the reaper.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(workers = self.workers, "Worker pool started");

        let (tx, rx) = mpsc::channel::<String>(1);
        let rx = Arc::new(Mutex::new(rx));

        let mut handles = Vec::with_capacity(self.workers);
        for n in 1..=self.workers {
            let rx = rx.clone();
            let queue = self.queue.clone();
            let processor = self.processor.clone();
            let cancel = shutdown.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let claimed = { rx.lock().await.recv().await };
                    let Some(id) = claimed else { break };

                    if let Err(err) = processor.process(&cancel, &id).await {
                        warn!(worker = n, job_id = %id, error = %err, "Process failed");
                    }
                    // Ack regardless of the outcome: the store already holds
                    // a terminal status for all but the earliest failures.
                    if let Err(err) = queue.ack(&id).await {
                        warn!(worker = n, job_id = %id, error = %err, "Ack failed");
                    }
                }
            }));
        }

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                claimed = self.queue.claim_blocking(Some(CLAIM_DELAY)) => match claimed {
                    Ok(Some(id)) => {
                        if tx.send(id).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        warn!(error = %err, "Claim failed");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                },
            }
        }

        drop(tx);
        for handle in handles {
            let _ = handle.await;
        }
        info!("Worker pool stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeStore, test_registry};
    use jobrunner_db::JobStatus;
    use jobrunner_queue::{MemoryLaneStore, QueueKeys};
    use serde_json::json;
    use tokio::time::{Instant, sleep};

    #[tokio::test]
    async fn pool_processes_and_acks_enqueued_jobs() {
        let lane_store = Arc::new(MemoryLaneStore::new());
        let queue = Arc::new(PriorityQueue::new(lane_store.clone(), QueueKeys::default()));
        let store = Arc::new(FakeStore::default());
        let processor = Arc::new(Processor::new(store.clone(), test_registry()));

        let id = store.insert("echo", json!({"x": 1}));
        queue.enqueue(&id.to_string(), 2).await.unwrap();

        let pool = Arc::new(WorkerPool::new(queue, processor, 2));
        let shutdown = CancellationToken::new();
        let running = tokio::spawn({
            let pool = pool.clone();
            let shutdown = shutdown.clone();
            async move { pool.run(shutdown).await }
        });

        // Wait for the job to be processed and acked.
        let deadline = Instant::now() + Duration::from_secs(3);
        loop {
            let done = store.get_sync(id).status == JobStatus::Done
                && lane_store.snapshot("jobs:processing:high").is_empty();
            if done {
                break;
            }
            assert!(Instant::now() < deadline, "job not processed in time");
            sleep(Duration::from_millis(10)).await;
        }

        let job = store.get_sync(id);
        assert_eq!(job.output, Some(json!({"x": 1})));
        assert!(lane_store.map_snapshot("jobs:processing:map").is_empty());

        shutdown.cancel();
        running.await.unwrap();
    }
}
