//! Application state.

use crate::service::JobService;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<JobService>,
}

impl AppState {
    pub fn new(jobs: Arc<JobService>) -> Self {
        Self { jobs }
    }
}
