//! Job handler trait and dispatch registry.
//!
//! Handlers are selected by the job's type string. The registry is built at
//! startup; dispatching an unregistered type fails with an `unknown job type`
//! error that ends the job in the `error` status.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{Error, Result};

/// A unit of work selected by job type.
///
/// Handlers receive the raw JSON input and a cancellation token. Delivery is
/// at-least-once, so a handler must tolerate running more than once for the
/// same job. Long handlers should honor cancellation at coarse suspension
/// points.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, input: &Value, cancel: &CancellationToken) -> Result<Value>;
}

/// Maps job type strings to handlers.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a job type, replacing any previous one.
    pub fn register(&mut self, job_type: impl Into<String>, handler: Arc<dyn JobHandler>) {
        self.handlers.insert(job_type.into(), handler);
    }

    /// Run the handler registered for `job_type`.
    pub async fn dispatch(
        &self,
        job_type: &str,
        input: &Value,
        cancel: &CancellationToken,
    ) -> Result<Value> {
        let handler = self
            .handlers
            .get(job_type)
            .ok_or_else(|| Error::UnknownJobType(job_type.to_string()))?;
        handler.handle(input, cancel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upper;

    #[async_trait]
    impl JobHandler for Upper {
        async fn handle(&self, input: &Value, _cancel: &CancellationToken) -> Result<Value> {
            let text = input["text"].as_str().unwrap_or_default();
            Ok(json!({ "text": text.to_uppercase() }))
        }
    }

    #[tokio::test]
    async fn dispatch_runs_the_registered_handler() {
        let mut registry = HandlerRegistry::new();
        registry.register("upper", Arc::new(Upper));

        let out = registry
            .dispatch("upper", &json!({"text": "hi"}), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(out, json!({"text": "HI"}));
    }

    #[tokio::test]
    async fn dispatch_fails_for_unknown_types() {
        let registry = HandlerRegistry::new();
        let err = registry
            .dispatch("nope", &json!({}), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown job type: nope");
    }
}
