//! Redis-backed lane store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

use crate::StoreResult;
use crate::store::LaneStore;

/// Lane store over Redis lists and one hash.
///
/// Lists map to LPUSH / LMOVE / LREM, the in-flight mapping to HSET / HGET /
/// HDEL. All commands share one multiplexed connection; only the single
/// claim loop issues blocking commands, so head-of-line blocking is bounded
/// by one claim slot.
#[derive(Clone)]
pub struct RedisLaneStore {
    conn: ConnectionManager,
}

impl RedisLaneStore {
    /// Connect to Redis and verify the connection with a PING.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl LaneStore for RedisLaneStore {
    async fn push_left(&self, list: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("LPUSH")
            .arg(list)
            .arg(value)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn move_right_to_left_blocking(
        &self,
        src: &str,
        dst: &str,
        wait: Duration,
    ) -> StoreResult<Option<String>> {
        // BLMOVE treats a zero timeout as "block forever".
        if wait.is_zero() {
            return self.move_right_to_left(src, dst).await;
        }
        let mut conn = self.conn.clone();
        let moved: Option<String> = redis::cmd("BLMOVE")
            .arg(src)
            .arg(dst)
            .arg("RIGHT")
            .arg("LEFT")
            .arg(wait.as_secs_f64())
            .query_async(&mut conn)
            .await?;
        Ok(moved)
    }

    async fn move_right_to_left(&self, src: &str, dst: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let moved: Option<String> = redis::cmd("LMOVE")
            .arg(src)
            .arg(dst)
            .arg("RIGHT")
            .arg("LEFT")
            .query_async(&mut conn)
            .await?;
        Ok(moved)
    }

    async fn remove_one(&self, list: &str, value: &str) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = redis::cmd("LREM")
            .arg(list)
            .arg(1)
            .arg(value)
            .query_async(&mut conn)
            .await?;
        Ok(removed)
    }

    async fn map_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("HSET")
            .arg(key)
            .arg(field)
            .arg(value)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn map_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("HGET")
            .arg(key)
            .arg(field)
            .query_async(&mut conn)
            .await?;
        Ok(value)
    }

    async fn map_del(&self, key: &str, field: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("HDEL")
            .arg(key)
            .arg(field)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}
