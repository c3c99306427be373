//! Built-in job handler catalog.
//!
//! Each handler simulates slow work with a sleep and honors cancellation at
//! that suspension point.

use async_trait::async_trait;
use jobrunner_core::{Error, HandlerRegistry, JobHandler, Result};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Returns its input unchanged after one second.
pub struct Echo;

#[async_trait]
impl JobHandler for Echo {
    async fn handle(&self, input: &Value, cancel: &CancellationToken) -> Result<Value> {
        simulate_work(Duration::from_secs(1), cancel).await?;
        if input.is_null() {
            return Ok(json!({}));
        }
        Ok(input.clone())
    }
}

/// Produces a fixed report URL after two seconds.
pub struct GenerateReport;

#[async_trait]
impl JobHandler for GenerateReport {
    async fn handle(&self, _input: &Value, cancel: &CancellationToken) -> Result<Value> {
        simulate_work(Duration::from_secs(2), cancel).await?;
        Ok(json!({ "report_url": "https://example.local/report/123" }))
    }
}

/// Produces a fixed converted-file URL after three seconds.
pub struct ConvertVideo;

#[async_trait]
impl JobHandler for ConvertVideo {
    async fn handle(&self, _input: &Value, cancel: &CancellationToken) -> Result<Value> {
        simulate_work(Duration::from_secs(3), cancel).await?;
        Ok(json!({ "file_url": "https://example.local/video/converted.mp4" }))
    }
}

/// The catalog registered by the worker binary.
pub fn default_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register("echo", Arc::new(Echo));
    registry.register("generate_report", Arc::new(GenerateReport));
    registry.register("convert_video", Arc::new(ConvertVideo));
    registry
}

async fn simulate_work(duration: Duration, cancel: &CancellationToken) -> Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
