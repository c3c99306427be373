//! Three-lane strict-priority queue with reliable delivery.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::QueueResult;
use crate::store::LaneStore;

/// One claim slot: the longest a single lane is blocked on before the next
/// lane is polled.
const CLAIM_SLOT: Duration = Duration::from_secs(1);

/// Datastore key layout for one queue.
#[derive(Debug, Clone)]
pub struct QueueKeys {
    /// Base of the ready lists; lanes append `:high`, `:normal`, `:low`.
    pub queue_base: String,
    /// Base of the in-flight lists, same lane suffixes.
    pub processing_base: String,
    /// Hash mapping claimed id -> in-flight list name.
    pub processing_map: String,
}

impl QueueKeys {
    pub fn new(
        queue_base: impl Into<String>,
        processing_base: impl Into<String>,
        processing_map: impl Into<String>,
    ) -> Self {
        Self {
            queue_base: queue_base.into(),
            processing_base: processing_base.into(),
            processing_map: processing_map.into(),
        }
    }
}

impl Default for QueueKeys {
    fn default() -> Self {
        Self::new("jobs:queue", "jobs:processing", "jobs:processing:map")
    }
}

/// A (ready, in-flight) list pair for one priority.
#[derive(Debug, Clone)]
struct Lane {
    ready: String,
    inflight: String,
}

/// Priority queue over a [`LaneStore`].
///
/// Enqueue appends to a lane's ready list; a claim atomically moves one id
/// from ready to the same lane's in-flight list and records which in-flight
/// list holds it; an ack removes the id again. Ids orphaned in an in-flight
/// list are returned to their ready list by [`PriorityQueue::requeue_stale`].
pub struct PriorityQueue {
    store: Arc<dyn LaneStore>,
    map_key: String,
    /// Indexed by priority: low, normal, high. Claims poll in reverse.
    lanes: [Lane; 3],
}

impl PriorityQueue {
    pub fn new(store: Arc<dyn LaneStore>, keys: QueueKeys) -> Self {
        let lane = |name: &str| Lane {
            ready: format!("{}:{}", keys.queue_base, name),
            inflight: format!("{}:{}", keys.processing_base, name),
        };
        Self {
            store,
            map_key: keys.processing_map,
            lanes: [lane("low"), lane("normal"), lane("high")],
        }
    }

    fn lane(&self, priority: i32) -> &Lane {
        &self.lanes[priority.clamp(0, 2) as usize]
    }

    fn by_priority_desc(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter().rev()
    }

    /// Append a job id to the ready list of its priority lane.
    /// Out-of-range priorities are clamped (negative to low, large to high).
    pub async fn enqueue(&self, id: &str, priority: i32) -> QueueResult<()> {
        self.store.push_left(&self.lane(priority).ready, id).await?;
        Ok(())
    }

    /// Claim one id, preferring higher lanes, blocking until work arrives or
    /// `timeout` elapses (`Ok(None)`). A `timeout` of `None` blocks
    /// indefinitely.
    ///
    /// No store primitive blocks across lists, so each lane is polled with a
    /// bounded blocking slot in the order high, normal, low. An empty high
    /// lane yields its slot to the next lane after at most one second, which
    /// keeps lower lanes from starving while preserving strict preference.
    pub async fn claim_blocking(&self, timeout: Option<Duration>) -> QueueResult<Option<String>> {
        let slot = match timeout {
            Some(timeout) => CLAIM_SLOT.min(timeout),
            None => CLAIM_SLOT,
        };
        let deadline = timeout.map(|timeout| Instant::now() + timeout);

        loop {
            for lane in self.by_priority_desc() {
                let mut wait = slot;
                if let Some(deadline) = deadline {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Ok(None);
                    }
                    wait = wait.min(remaining);
                }

                let moved = self
                    .store
                    .move_right_to_left_blocking(&lane.ready, &lane.inflight, wait)
                    .await?;
                if let Some(id) = moved {
                    // On a failed map write the id sits in in-flight
                    // untracked until the reaper returns it; the claim must
                    // then fail.
                    self.store.map_set(&self.map_key, &id, &lane.inflight).await?;
                    return Ok(Some(id));
                }
            }
        }
    }

    /// Confirm a claimed id reached a terminal outcome, removing it from its
    /// bound in-flight list. Acking an id that is no longer tracked still
    /// succeeds, so a double ack or an ack racing the reaper is benign.
    pub async fn ack(&self, id: &str) -> QueueResult<()> {
        match self.store.map_get(&self.map_key, id).await? {
            Some(inflight) => {
                self.store.remove_one(&inflight, id).await?;
                let _ = self.store.map_del(&self.map_key, id).await;
            }
            None => {
                // Mapping lost (reaper race or manual intervention): sweep
                // every in-flight list instead.
                for lane in &self.lanes {
                    let _ = self.store.remove_one(&lane.inflight, id).await;
                }
            }
        }
        Ok(())
    }

    /// Move up to `max_per_lane` ids per lane from in-flight back to ready
    /// and return the total moved. Any id still in an in-flight list when
    /// this runs is treated as stale; there is no per-id lease.
    pub async fn requeue_stale(&self, max_per_lane: usize) -> QueueResult<usize> {
        let mut moved = 0;
        for lane in self.by_priority_desc() {
            for _ in 0..max_per_lane {
                match self
                    .store
                    .move_right_to_left(&lane.inflight, &lane.ready)
                    .await?
                {
                    Some(id) => {
                        moved += 1;
                        let _ = self.store.map_del(&self.map_key, &id).await;
                    }
                    None => break,
                }
            }
        }
        Ok(moved)
    }
}
