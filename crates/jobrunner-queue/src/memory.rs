//! In-memory lane store for tests and single-process development.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

use crate::StoreResult;
use crate::store::LaneStore;

/// Lane store backed by process-local maps.
///
/// Mirrors the Redis list semantics, including the blocking move, without a
/// server. A wake-up can be missed between the emptiness check and the wait;
/// the move then completes on the next poll within the same `wait` window.
#[derive(Default)]
pub struct MemoryLaneStore {
    inner: Mutex<Inner>,
    notify: Notify,
}

#[derive(Default)]
struct Inner {
    lists: HashMap<String, VecDeque<String>>,
    maps: HashMap<String, HashMap<String, String>>,
}

impl MemoryLaneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of a list, head first.
    pub fn snapshot(&self, list: &str) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .lists
            .get(list)
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Current contents of a mapping.
    pub fn map_snapshot(&self, key: &str) -> HashMap<String, String> {
        let inner = self.inner.lock().unwrap();
        inner.maps.get(key).cloned().unwrap_or_default()
    }

    fn try_move(&self, src: &str, dst: &str) -> Option<String> {
        let mut inner = self.inner.lock().unwrap();
        let value = inner.lists.get_mut(src)?.pop_back()?;
        inner
            .lists
            .entry(dst.to_string())
            .or_default()
            .push_front(value.clone());
        Some(value)
    }
}

#[async_trait]
impl LaneStore for MemoryLaneStore {
    async fn push_left(&self, list: &str, value: &str) -> StoreResult<()> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner
                .lists
                .entry(list.to_string())
                .or_default()
                .push_front(value.to_string());
        }
        self.notify.notify_waiters();
        Ok(())
    }

    async fn move_right_to_left_blocking(
        &self,
        src: &str,
        dst: &str,
        wait: Duration,
    ) -> StoreResult<Option<String>> {
        let deadline = Instant::now() + wait;
        loop {
            let notified = self.notify.notified();
            if let Some(value) = self.try_move(src, dst) {
                self.notify.notify_waiters();
                return Ok(Some(value));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let _ = tokio::time::timeout(remaining, notified).await;
        }
    }

    async fn move_right_to_left(&self, src: &str, dst: &str) -> StoreResult<Option<String>> {
        let moved = self.try_move(src, dst);
        if moved.is_some() {
            self.notify.notify_waiters();
        }
        Ok(moved)
    }

    async fn remove_one(&self, list: &str, value: &str) -> StoreResult<u64> {
        let mut inner = self.inner.lock().unwrap();
        let Some(list) = inner.lists.get_mut(list) else {
            return Ok(0);
        };
        match list.iter().position(|v| v == value) {
            Some(index) => {
                list.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn map_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .maps
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn map_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .maps
            .get(key)
            .and_then(|map| map.get(field))
            .cloned())
    }

    async fn map_del(&self, key: &str, field: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(map) = inner.maps.get_mut(key) {
            map.remove(field);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_behave_as_fifo_between_push_and_move() {
        let store = MemoryLaneStore::new();
        store.push_left("src", "first").await.unwrap();
        store.push_left("src", "second").await.unwrap();

        let moved = store.move_right_to_left("src", "dst").await.unwrap();
        assert_eq!(moved.as_deref(), Some("first"));
        assert_eq!(store.snapshot("src"), vec!["second"]);
        assert_eq!(store.snapshot("dst"), vec!["first"]);
    }

    #[tokio::test]
    async fn blocking_move_returns_none_when_empty() {
        let store = MemoryLaneStore::new();
        let moved = store
            .move_right_to_left_blocking("src", "dst", Duration::from_millis(50))
            .await
            .unwrap();
        assert!(moved.is_none());
    }

    #[tokio::test]
    async fn remove_one_removes_a_single_occurrence() {
        let store = MemoryLaneStore::new();
        store.push_left("list", "a").await.unwrap();
        store.push_left("list", "b").await.unwrap();
        store.push_left("list", "a").await.unwrap();

        assert_eq!(store.remove_one("list", "a").await.unwrap(), 1);
        assert_eq!(store.snapshot("list"), vec!["b", "a"]);
        assert_eq!(store.remove_one("list", "missing").await.unwrap(), 0);
    }
}
