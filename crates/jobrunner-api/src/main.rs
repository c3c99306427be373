//! Job submission API server.

use jobrunner_api::config::ApiConfig;
use jobrunner_api::service::JobService;
use jobrunner_api::{AppState, routes};
use jobrunner_db::{PgJobStore, create_pool, run_migrations};
use jobrunner_queue::{PriorityQueue, RedisLaneStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ApiConfig::from_env()?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    info!("Database ready");

    let lane_store = Arc::new(RedisLaneStore::connect(&config.redis_url).await?);
    let queue = Arc::new(PriorityQueue::new(lane_store, config.queue_keys.clone()));
    let job_store = Arc::new(PgJobStore::new(pool));
    let state = AppState::new(Arc::new(JobService::new(job_store, queue)));

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
