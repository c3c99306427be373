//! Database layer for jobrunner.
//!
//! Provides the job store port and its PostgreSQL implementation.

pub mod error;
pub mod job_store;

pub use error::{DbError, DbResult};
pub use job_store::{Job, JobStatus, JobStore, PgJobStore};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Create a new database connection pool.
pub async fn create_pool(database_url: &str) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Run database migrations.
pub async fn run_migrations(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
