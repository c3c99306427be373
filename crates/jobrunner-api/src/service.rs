//! Job submission service: validation, persistence, enqueue.

use jobrunner_db::{DbError, Job, JobStore};
use jobrunner_queue::{PriorityQueue, QueueError};
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Priority assigned when a request omits the field or sends a value
/// outside [0, 2].
const DEFAULT_PRIORITY: i32 = 1;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("type is required")]
    MissingType,

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Request to create a job.
#[derive(Debug)]
pub struct CreateJob {
    pub job_type: String,
    pub priority: Option<i32>,
    pub input: Option<Value>,
}

/// Coordinates the job store and the queue for the HTTP surface.
pub struct JobService {
    store: Arc<dyn JobStore>,
    queue: Arc<PriorityQueue>,
}

impl JobService {
    pub fn new(store: Arc<dyn JobStore>, queue: Arc<PriorityQueue>) -> Self {
        Self { store, queue }
    }

    /// Persist a new pending job and enqueue its id.
    pub async fn create_job(&self, req: CreateJob) -> Result<Uuid, ServiceError> {
        if req.job_type.is_empty() {
            return Err(ServiceError::MissingType);
        }

        let priority = match req.priority {
            Some(priority) if (0..=2).contains(&priority) => priority,
            _ => DEFAULT_PRIORITY,
        };
        let input = match req.input {
            Some(Value::Null) | None => json!({}),
            Some(input) => input,
        };

        let job = self.store.create(&req.job_type, priority, input).await?;
        self.queue.enqueue(&job.id.to_string(), priority).await?;
        Ok(job.id)
    }

    pub async fn get_job(&self, id: Uuid) -> Result<Job, ServiceError> {
        Ok(self.store.get(id).await?)
    }
}
