//! Worker binary: claims and executes jobs until shut down.

use jobrunner_db::{PgJobStore, create_pool};
use jobrunner_queue::{PriorityQueue, RedisLaneStore};
use jobrunner_worker::config::redact_dsn;
use jobrunner_worker::{Processor, Reaper, WorkerConfig, WorkerPool, handlers};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = WorkerConfig::from_env()?;
    info!(
        workers = config.workers,
        queue_key = %config.queue_keys.queue_base,
        processing_key = %config.queue_keys.processing_base,
        database_url = %redact_dsn(&config.database_url),
        "Worker starting"
    );

    let pool = create_pool(&config.database_url).await?;
    let lane_store = Arc::new(RedisLaneStore::connect(&config.redis_url).await?);
    let queue = Arc::new(PriorityQueue::new(lane_store, config.queue_keys.clone()));
    let job_store = Arc::new(PgJobStore::new(pool));
    let registry = Arc::new(handlers::default_registry());
    let processor = Arc::new(Processor::new(job_store, registry));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    let reaper = Reaper::new(queue.clone()).with_interval(config.reaper_interval);
    let reaper_task = tokio::spawn({
        let shutdown = shutdown.clone();
        async move { reaper.run(shutdown).await }
    });

    let workers = WorkerPool::new(queue, processor, config.workers);
    workers.run(shutdown).await;

    let _ = reaper_task.await;
    info!("Worker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
