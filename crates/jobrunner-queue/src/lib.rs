//! Reliable priority job queue on top of simple list primitives.
//!
//! Three lanes (high/normal/low), each a ready list plus an in-flight list in
//! a shared datastore. A claim atomically moves one id from ready to
//! in-flight; an ack removes it; a periodic reaper moves orphaned in-flight
//! ids back to ready. Delivery is at-least-once: an id may be handed to
//! workers more than once across crashes.

pub mod error;
pub mod memory;
pub mod queue;
pub mod redis;
pub mod store;

pub use error::{QueueError, QueueResult, StoreError, StoreResult};
pub use memory::MemoryLaneStore;
pub use queue::{PriorityQueue, QueueKeys};
pub use self::redis::RedisLaneStore;
pub use store::LaneStore;
