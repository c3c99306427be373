//! API configuration from the environment.

use std::env;

use jobrunner_queue::QueueKeys;

/// Runtime configuration for the API binary.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub redis_url: String,
    pub queue_keys: QueueKeys,
    pub port: u16,
}

impl ApiConfig {
    /// Read configuration from the environment. `DATABASE_URL` is required.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("missing env: DATABASE_URL"))?;
        let redis_url = env_or("REDIS_URL", "redis://127.0.0.1:6379");

        let queue_base = env_or("REDIS_QUEUE_KEY", "jobs:queue");
        let processing_base = env_or("REDIS_PROCESSING_KEY", "jobs:processing");
        let processing_map = env::var("REDIS_PROCESSING_MAP_KEY")
            .unwrap_or_else(|_| format!("{}:map", processing_base));

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(3000);

        Ok(Self {
            database_url,
            redis_url,
            queue_keys: QueueKeys::new(queue_base, processing_base, processing_map),
            port,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
