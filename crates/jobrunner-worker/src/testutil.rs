//! Shared fakes for the worker tests.

use async_trait::async_trait;
use chrono::Utc;
use jobrunner_core::{HandlerRegistry, JobHandler};
use jobrunner_db::{DbError, DbResult, Job, JobStatus, JobStore};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// In-memory job store mirroring the Postgres semantics the processor needs.
#[derive(Default)]
pub struct FakeStore {
    jobs: Mutex<HashMap<Uuid, Job>>,
}

impl FakeStore {
    pub fn insert(&self, job_type: &str, input: Value) -> Uuid {
        let id = Uuid::now_v7();
        let now = Utc::now();
        self.jobs.lock().unwrap().insert(
            id,
            Job {
                id,
                job_type: job_type.to_string(),
                status: JobStatus::Pending,
                priority: 1,
                input,
                output: None,
                error: None,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    pub fn get_sync(&self, id: Uuid) -> Job {
        self.jobs.lock().unwrap().get(&id).cloned().expect("job exists")
    }
}

#[async_trait]
impl JobStore for FakeStore {
    async fn create(&self, job_type: &str, priority: i32, input: Value) -> DbResult<Job> {
        let id = self.insert(job_type, input);
        let mut job = self.get_sync(id);
        job.priority = priority;
        self.jobs.lock().unwrap().insert(id, job.clone());
        Ok(job)
    }

    async fn get(&self, id: Uuid) -> DbResult<Job> {
        self.jobs
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("job {}", id)))
    }

    async fn update_status(&self, id: Uuid, status: JobStatus) -> DbResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("job {}", id)))?;
        job.status = status;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn set_done(&self, id: Uuid, output: Value) -> DbResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("job {}", id)))?;
        job.status = JobStatus::Done;
        job.output = Some(if output.is_null() { json!({}) } else { output });
        job.error = None;
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> DbResult<()> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("job {}", id)))?;
        job.status = JobStatus::Error;
        job.error = Some(message.to_string());
        job.updated_at = Utc::now();
        Ok(())
    }
}

/// Echo handler without the simulated delay.
pub struct InstantEcho;

#[async_trait]
impl JobHandler for InstantEcho {
    async fn handle(
        &self,
        input: &Value,
        _cancel: &CancellationToken,
    ) -> jobrunner_core::Result<Value> {
        Ok(input.clone())
    }
}

pub fn test_registry() -> Arc<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry.register("echo", Arc::new(InstantEcho));
    Arc::new(registry)
}
