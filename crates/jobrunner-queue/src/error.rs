//! Queue error types.

use thiserror::Error;

/// Error from a lane store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error surfaced by queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("datastore error: {0}")]
    Store(#[from] StoreError),
}

pub type QueueResult<T> = std::result::Result<T, QueueError>;
