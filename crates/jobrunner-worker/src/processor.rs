//! Single-job execution: status transitions plus handler dispatch.

use jobrunner_core::HandlerRegistry;
use jobrunner_db::{DbError, JobStatus, JobStore};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Failure of a single processing attempt.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("invalid job id {0}")]
    InvalidId(String),

    #[error(transparent)]
    Store(#[from] DbError),

    #[error(transparent)]
    Handler(#[from] jobrunner_core::Error),
}

/// Executes one claimed job end-to-end.
pub struct Processor {
    store: Arc<dyn JobStore>,
    registry: Arc<HandlerRegistry>,
}

impl Processor {
    pub fn new(store: Arc<dyn JobStore>, registry: Arc<HandlerRegistry>) -> Self {
        Self { store, registry }
    }

    /// Run the job behind `raw_id` and persist its outcome.
    ///
    /// The status transitions are not atomic with the queue: a crash after
    /// the job reached `processing` leaves the id to the reaper, and the
    /// next delivery overwrites the outcome.
    pub async fn process(
        &self,
        cancel: &CancellationToken,
        raw_id: &str,
    ) -> Result<(), ProcessError> {
        let started = Instant::now();

        let id = Uuid::parse_str(raw_id).map_err(|_| ProcessError::InvalidId(raw_id.to_string()))?;

        self.store.update_status(id, JobStatus::Processing).await?;
        let job = self.store.get(id).await?;

        info!(job_id = %id, job_type = %job.job_type, "Processing job");

        match self
            .registry
            .dispatch(&job.job_type, &job.input, cancel)
            .await
        {
            Ok(output) => {
                self.store.set_done(id, output).await?;
                info!(
                    job_id = %id,
                    job_type = %job.job_type,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Job done"
                );
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                if let Err(store_err) = self.store.set_error(id, &message).await {
                    warn!(job_id = %id, error = %store_err, "Failed to record job error");
                }
                warn!(
                    job_id = %id,
                    job_type = %job.job_type,
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %message,
                    "Job failed"
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeStore, test_registry};
    use serde_json::json;

    #[tokio::test]
    async fn process_marks_the_job_done_with_output() {
        let store = Arc::new(FakeStore::default());
        let id = store.insert("echo", json!({"x": 1}));
        let processor = Processor::new(store.clone(), test_registry());

        processor
            .process(&CancellationToken::new(), &id.to_string())
            .await
            .unwrap();

        let job = store.get_sync(id);
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.output, Some(json!({"x": 1})));
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn process_records_unknown_type_errors() {
        let store = Arc::new(FakeStore::default());
        let id = store.insert("nope", json!({}));
        let processor = Processor::new(store.clone(), test_registry());

        let err = processor
            .process(&CancellationToken::new(), &id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Handler(_)));

        let job = store.get_sync(id);
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error.as_deref(), Some("unknown job type: nope"));
    }

    #[tokio::test]
    async fn process_overwrites_a_crashed_prior_attempt() {
        let store = Arc::new(FakeStore::default());
        let id = store.insert("echo", json!({"x": 1}));
        let processor = Processor::new(store.clone(), test_registry());

        // A previous worker died after moving the job to processing; the
        // redelivered id must still run to completion.
        store.update_status(id, JobStatus::Processing).await.unwrap();
        processor
            .process(&CancellationToken::new(), &id.to_string())
            .await
            .unwrap();

        let job = store.get_sync(id);
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.output, Some(json!({"x": 1})));
    }

    #[tokio::test]
    async fn process_rejects_malformed_ids() {
        let store = Arc::new(FakeStore::default());
        let processor = Processor::new(store, test_registry());

        let err = processor
            .process(&CancellationToken::new(), "not-a-uuid")
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidId(_)));
    }

    #[tokio::test]
    async fn process_surfaces_missing_jobs() {
        let store = Arc::new(FakeStore::default());
        let processor = Processor::new(store, test_registry());

        let err = processor
            .process(&CancellationToken::new(), &Uuid::now_v7().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ProcessError::Store(DbError::NotFound(_))));
    }
}
