//! clipvault-recency — the per-user recently-used working set.
//!
//! A bounded, ordered list of snippet ids per user, head = most recent.
//! The queue is authoritative for *ordering* only; the metadata store is
//! authoritative for existence. Consistency is best-effort: racing pushes
//! and removes are tolerated because every operation is idempotent enough
//! (truncate to cap, remove-all-occurrences) and the retrieval path
//! re-checks existence against the store.
//!
//! Two implementations ship behind the [`RecencyQueue`] trait:
//! - [`RedisRecencyQueue`]: Redis lists (`LPUSH`/`LTRIM`/`LREM`/`LRANGE`)
//!   under `clipvault:recent:{user_id}`, every command wrapped in a
//!   per-operation deadline.
//! - [`InMemoryRecencyQueue`]: a mutex-guarded map of deques with identical
//!   semantics, used in tests and single-node deployments without Redis.

mod error;
mod memory;
mod redis_queue;

pub use error::QueueError;
pub use memory::InMemoryRecencyQueue;
pub use redis_queue::RedisRecencyQueue;

use async_trait::async_trait;
use clipvault_core::{SnippetId, UserId};

/// Per-user ordered id list. All operations are O(cap) or better.
#[async_trait]
pub trait RecencyQueue: Send + Sync {
    /// Prepend `id`, then truncate the list to the configured cap.
    async fn push_front(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError>;

    /// Remove every existing occurrence of `id`, then prepend it.
    async fn move_to_front(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError>;

    /// Up to `cap` ids, most recent first; empty when the user has none.
    async fn recent(&self, owner: UserId) -> Result<Vec<SnippetId>, QueueError>;

    /// Remove every occurrence of `id`.
    async fn remove(&self, owner: UserId, id: SnippetId) -> Result<(), QueueError>;

    /// Drop the user's entire list.
    async fn clear(&self, owner: UserId) -> Result<(), QueueError>;

    async fn len(&self, owner: UserId) -> Result<usize, QueueError>;
}
