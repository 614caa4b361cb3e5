use crate::{QueueError, RecencyQueue};
use async_trait::async_trait;
use clipvault_core::{SnippetId, UserId};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

/// Process-local recency queue with the same semantics as the Redis one.
/// Backs tests and deployments that run without Redis.
#[derive(Debug)]
pub struct InMemoryRecencyQueue {
    cap: usize,
    lists: Mutex<HashMap<i64, VecDeque<i64>>>,
}

impl InMemoryRecencyQueue {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            lists: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RecencyQueue for InMemoryRecencyQueue {
    async fn push_front(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError> {
        let mut lists = self.lists.lock().await;
        let list = lists.entry(owner.0).or_default();
        list.push_front(id.0);
        list.truncate(self.cap);
        Ok(())
    }

    async fn move_to_front(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError> {
        let mut lists = self.lists.lock().await;
        let list = lists.entry(owner.0).or_default();
        list.retain(|&existing| existing != id.0);
        list.push_front(id.0);
        list.truncate(self.cap);
        Ok(())
    }

    async fn recent(&self, owner: UserId) -> Result<Vec<SnippetId>, QueueError> {
        let lists = self.lists.lock().await;
        Ok(lists
            .get(&owner.0)
            .map(|list| list.iter().take(self.cap).copied().map(SnippetId).collect())
            .unwrap_or_default())
    }

    async fn remove(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError> {
        let mut lists = self.lists.lock().await;
        if let Some(list) = lists.get_mut(&owner.0) {
            list.retain(|&existing| existing != id.0);
        }
        Ok(())
    }

    async fn clear(&self, owner: UserId) -> Result<(), QueueError> {
        self.lists.lock().await.remove(&owner.0);
        Ok(())
    }

    async fn len(&self, owner: UserId) -> Result<usize, QueueError> {
        let lists = self.lists.lock().await;
        Ok(lists.get(&owner.0).map(VecDeque::len).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U: UserId = UserId(1);

    fn ids(raw: &[i64]) -> Vec<SnippetId> {
        raw.iter().copied().map(SnippetId).collect()
    }

    #[tokio::test]
    async fn push_front_orders_most_recent_first() {
        let q = InMemoryRecencyQueue::new(50);
        for id in [1, 2, 3] {
            q.push_front(U, SnippetId(id)).await.unwrap();
        }
        assert_eq!(q.recent(U).await.unwrap(), ids(&[3, 2, 1]));
        assert_eq!(q.len(U).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn push_front_truncates_to_cap() {
        let q = InMemoryRecencyQueue::new(3);
        for id in 1..=5 {
            q.push_front(U, SnippetId(id)).await.unwrap();
        }
        assert_eq!(q.recent(U).await.unwrap(), ids(&[5, 4, 3]));
    }

    #[tokio::test]
    async fn move_to_front_removes_prior_occurrences() {
        let q = InMemoryRecencyQueue::new(50);
        for id in [1, 2, 3] {
            q.push_front(U, SnippetId(id)).await.unwrap();
        }
        q.move_to_front(U, SnippetId(1)).await.unwrap();
        assert_eq!(q.recent(U).await.unwrap(), ids(&[1, 3, 2]));
    }

    #[tokio::test]
    async fn move_to_front_is_idempotent() {
        let q = InMemoryRecencyQueue::new(50);
        for id in [1, 2, 3] {
            q.push_front(U, SnippetId(id)).await.unwrap();
        }
        q.move_to_front(U, SnippetId(2)).await.unwrap();
        let once = q.recent(U).await.unwrap();
        q.move_to_front(U, SnippetId(2)).await.unwrap();
        assert_eq!(q.recent(U).await.unwrap(), once);
    }

    #[tokio::test]
    async fn remove_deletes_all_occurrences() {
        let q = InMemoryRecencyQueue::new(50);
        // Racing pushes can duplicate an id; remove must clear them all.
        q.push_front(U, SnippetId(9)).await.unwrap();
        q.push_front(U, SnippetId(2)).await.unwrap();
        q.push_front(U, SnippetId(9)).await.unwrap();
        q.remove(U, SnippetId(9)).await.unwrap();
        assert_eq!(q.recent(U).await.unwrap(), ids(&[2]));
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let q = InMemoryRecencyQueue::new(50);
        q.push_front(UserId(1), SnippetId(1)).await.unwrap();
        q.push_front(UserId(2), SnippetId(2)).await.unwrap();
        assert_eq!(q.recent(UserId(1)).await.unwrap(), ids(&[1]));
        assert_eq!(q.recent(UserId(2)).await.unwrap(), ids(&[2]));

        q.clear(UserId(1)).await.unwrap();
        assert!(q.recent(UserId(1)).await.unwrap().is_empty());
        assert_eq!(q.recent(UserId(2)).await.unwrap(), ids(&[2]));
    }
}
