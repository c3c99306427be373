//! Ordered-sequence and mapping primitives over a shared datastore.

use async_trait::async_trait;
use std::time::Duration;

use crate::StoreResult;

/// The list and mapping primitives the queue is built on.
///
/// Each call is atomic on its own; no call touches more than one list pair.
#[async_trait]
pub trait LaneStore: Send + Sync {
    /// Prepend a value to a list.
    async fn push_left(&self, list: &str, value: &str) -> StoreResult<()>;

    /// Atomically pop the rightmost element of `src`, prepend it to `dst`
    /// and return it, blocking up to `wait` while `src` is empty. `None`
    /// means `src` stayed empty for the whole wait.
    async fn move_right_to_left_blocking(
        &self,
        src: &str,
        dst: &str,
        wait: Duration,
    ) -> StoreResult<Option<String>>;

    /// Non-blocking variant of [`LaneStore::move_right_to_left_blocking`].
    async fn move_right_to_left(&self, src: &str, dst: &str) -> StoreResult<Option<String>>;

    /// Remove one occurrence of `value` from `list`, scanning from the head.
    /// Returns the number of elements removed.
    async fn remove_one(&self, list: &str, value: &str) -> StoreResult<u64>;

    /// Set `field` to `value` in the mapping at `key`.
    async fn map_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Read `field` from the mapping at `key`.
    async fn map_get(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Delete `field` from the mapping at `key`.
    async fn map_del(&self, key: &str, field: &str) -> StoreResult<()>;
}
