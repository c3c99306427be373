//! Background worker: claims job ids from the priority queue, executes them
//! through the handler registry and persists outcomes.

pub mod config;
pub mod handlers;
pub mod pool;
pub mod processor;
pub mod reaper;

#[cfg(test)]
mod testutil;

pub use config::WorkerConfig;
pub use pool::WorkerPool;
pub use processor::{ProcessError, Processor};
pub use reaper::Reaper;
