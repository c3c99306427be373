//! Job submission and retrieval endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::service::CreateJob;
use jobrunner_db::{Job, JobStatus};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_job))
        .route("/{id}", get(get_job))
        .route("/{id}/result", get(get_job_result))
}

#[derive(Debug, Deserialize)]
struct CreateJobRequest {
    #[serde(rename = "type")]
    job_type: String,
    /// 0 = low, 1 = normal, 2 = high; anything else falls back to normal.
    priority: Option<i32>,
    input: Option<Value>,
}

#[derive(Debug, Serialize)]
struct CreateJobResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct JobResponse {
    id: String,
    #[serde(rename = "type")]
    job_type: String,
    status: JobStatus,
    priority: i32,
    input: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        // The output is only surfaced once the job is done.
        let output = (job.status == JobStatus::Done).then_some(job.output).flatten();
        Self {
            id: job.id.to_string(),
            job_type: job.job_type,
            status: job.status,
            priority: job.priority,
            input: job.input,
            output,
            error: job.error,
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<CreateJobResponse>), ApiError> {
    let id = state
        .jobs
        .create_job(CreateJob {
            job_type: req.job_type,
            priority: req.priority,
            input: req.input,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateJobResponse { id: id.to_string() }),
    ))
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state.jobs.get_job(id).await?;
    Ok(Json(job.into()))
}

async fn get_job_result(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let job = state.jobs.get_job(id).await?;
    if job.status != JobStatus::Done {
        return Err(ApiError::Conflict("job not done".to_string()));
    }
    Ok(Json(job.output.unwrap_or_else(|| serde_json::json!({}))))
}
