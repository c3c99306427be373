//! Worker configuration from the environment.

use std::env;
use std::time::Duration;

use jobrunner_queue::QueueKeys;
use regex::Regex;

/// Runtime configuration for the worker binary.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub database_url: String,
    pub redis_url: String,
    pub workers: usize,
    pub queue_keys: QueueKeys,
    pub reaper_interval: Duration,
}

impl WorkerConfig {
    /// Read configuration from the environment. `DATABASE_URL` is required.
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("missing env: DATABASE_URL"))?;
        let redis_url = env_or("REDIS_URL", "redis://127.0.0.1:6379");
        let workers = env_parse_or("WORKERS", 4);

        let queue_base = env_or("REDIS_QUEUE_KEY", "jobs:queue");
        let processing_base = env_or("REDIS_PROCESSING_KEY", "jobs:processing");
        let processing_map = env::var("REDIS_PROCESSING_MAP_KEY")
            .unwrap_or_else(|_| format!("{}:map", processing_base));

        let reaper_interval = Duration::from_secs(env_parse_or("REAPER_INTERVAL_SECS", 30));

        Ok(Self {
            database_url,
            redis_url,
            workers,
            queue_keys: QueueKeys::new(queue_base, processing_base, processing_map),
            reaper_interval,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Mask the password in a database DSN for logging.
pub fn redact_dsn(dsn: &str) -> String {
    let re = Regex::new(r"://([^:/?#]+):([^@/]+)@").expect("static pattern");
    re.replace(dsn, "://$1:****@").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_dsn_masks_the_password() {
        assert_eq!(
            redact_dsn("postgres://jobs:s3cret@db:5432/jobs"),
            "postgres://jobs:****@db:5432/jobs"
        );
    }

    #[test]
    fn redact_dsn_leaves_passwordless_dsns_untouched() {
        assert_eq!(
            redact_dsn("postgres://db:5432/jobs"),
            "postgres://db:5432/jobs"
        );
    }
}
