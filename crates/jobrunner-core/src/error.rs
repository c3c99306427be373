//! Error types for jobrunner.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown job type: {0}")]
    UnknownJobType(String),

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
