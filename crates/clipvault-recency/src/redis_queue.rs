use crate::{QueueError, RecencyQueue};
use async_trait::async_trait;
use clipvault_core::{SnippetId, UserId};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;

/// Redis-backed recency queue.
///
/// One list per user under `clipvault:recent:{user_id}`, head = most recent.
/// Mutating operations run as atomic `MULTI` pipelines so the
/// prepend/truncate pair cannot be observed half-applied. Every command is
/// bounded by a per-operation deadline; the caller decides whether a timeout
/// degrades (read paths) or is merely logged (write paths).
pub struct RedisRecencyQueue {
    manager: ConnectionManager,
    cap: usize,
    op_timeout: Duration,
}

impl RedisRecencyQueue {
    pub async fn connect(
        url: &str,
        cap: usize,
        op_timeout: Duration,
    ) -> Result<Self, QueueError> {
        let client = redis::Client::open(url).map_err(QueueError::from)?;
        let manager = client.get_connection_manager().await?;
        tracing::debug!(cap, ?op_timeout, "recency queue connected");
        Ok(Self {
            manager,
            cap,
            op_timeout,
        })
    }

    fn key(owner: UserId) -> String {
        format!("clipvault:recent:{owner}")
    }

    async fn deadline<T, F>(&self, op: &'static str, fut: F) -> Result<T, QueueError>
    where
        F: Future<Output = Result<T, redis::RedisError>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(QueueError::from),
            Err(_) => Err(QueueError::Timeout {
                op,
                ms: self.op_timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl RecencyQueue for RedisRecencyQueue {
    async fn push_front(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError> {
        let key = Self::key(owner);
        let mut con = self.manager.clone();
        let cap_end = self.cap as isize - 1;
        self.deadline("push_front", async move {
            redis::pipe()
                .atomic()
                .lpush(&key, id.0)
                .ignore()
                .ltrim(&key, 0, cap_end)
                .ignore()
                .query_async::<()>(&mut con)
                .await
        })
        .await
    }

    async fn move_to_front(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError> {
        let key = Self::key(owner);
        let mut con = self.manager.clone();
        let cap_end = self.cap as isize - 1;
        self.deadline("move_to_front", async move {
            redis::pipe()
                .atomic()
                .lrem(&key, 0, id.0)
                .ignore()
                .lpush(&key, id.0)
                .ignore()
                .ltrim(&key, 0, cap_end)
                .ignore()
                .query_async::<()>(&mut con)
                .await
        })
        .await
    }

    async fn recent(&self, owner: UserId) -> Result<Vec<SnippetId>, QueueError> {
        let key = Self::key(owner);
        let mut con = self.manager.clone();
        let cap_end = self.cap as isize - 1;
        let raw: Vec<i64> = self
            .deadline("recent", async move { con.lrange(&key, 0, cap_end).await })
            .await?;
        Ok(raw.into_iter().map(SnippetId).collect())
    }

    async fn remove(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError> {
        let key = Self::key(owner);
        let mut con = self.manager.clone();
        let _removed: i64 = self
            .deadline("remove", async move { con.lrem(&key, 0, id.0).await })
            .await?;
        Ok(())
    }

    async fn clear(&self, owner: UserId) -> Result<(), QueueError> {
        let key = Self::key(owner);
        let mut con = self.manager.clone();
        let _deleted: i64 = self
            .deadline("clear", async move { con.del(&key).await })
            .await?;
        Ok(())
    }

    async fn len(&self, owner: UserId) -> Result<usize, QueueError> {
        let key = Self::key(owner);
        let mut con = self.manager.clone();
        let n: i64 = self
            .deadline("len", async move { con.llen(&key).await })
            .await?;
        Ok(n.max(0) as usize)
    }
}
