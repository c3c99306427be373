//! The job store port and its PostgreSQL implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, DbResult};

/// Lifecycle states of a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted job record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    pub id: Uuid,
    pub job_type: String,
    pub status: JobStatus,
    /// 0 = low, 1 = normal, 2 = high.
    pub priority: i32,
    pub input: Value,
    pub output: Option<Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The interface the processor and the job service use to read and mutate
/// job records.
///
/// Each operation is a single atomic statement; [`DbError::NotFound`] is
/// distinguishable from transport failures.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new pending job and return the stored record.
    async fn create(&self, job_type: &str, priority: i32, input: Value) -> DbResult<Job>;

    async fn get(&self, id: Uuid) -> DbResult<Job>;

    async fn update_status(&self, id: Uuid, status: JobStatus) -> DbResult<()>;

    /// Set status to `done` with the output, clearing any previous error.
    async fn set_done(&self, id: Uuid, output: Value) -> DbResult<()>;

    /// Set status to `error` with the failure message.
    async fn set_error(&self, id: Uuid, message: &str) -> DbResult<()>;
}

/// PostgreSQL implementation of [`JobStore`].
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job_type: &str, priority: i32, input: Value) -> DbResult<Job> {
        let input = if input.is_null() { json!({}) } else { input };
        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, job_type, status, priority, input, created_at, updated_at)
            VALUES ($1, $2, 'pending', $3, $4, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(job_type)
        .bind(priority)
        .bind(input)
        .fetch_one(&self.pool)
        .await?;
        Ok(job)
    }

    async fn get(&self, id: Uuid) -> DbResult<Job> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("job {}", id)))?;
        Ok(job)
    }

    async fn update_status(&self, id: Uuid, status: JobStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE jobs SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("job {}", id)));
        }
        Ok(())
    }

    async fn set_done(&self, id: Uuid, output: Value) -> DbResult<()> {
        let output = if output.is_null() { json!({}) } else { output };
        let result = sqlx::query(
            "UPDATE jobs SET status = 'done', output = $2, error = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(output)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("job {}", id)));
        }
        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE jobs SET status = 'error', error = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(message)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(format!("job {}", id)));
        }
        Ok(())
    }
}
