//! clipvault-service — the snippet storage coordinator.
//!
//! [`SnippetService`] implements the engine's public operations: accept,
//! fetch-recent, fetch-one, search, delete, and touch, plus the background
//! processing that turns an accepted plaintext into compressed chunk rows.
//! It owns the transactional boundary around accept and delete and drives
//! the stateless dependencies: the metadata store is authoritative for
//! existence, the recency queue for ordering, the pipeline for transforms.
//!
//! Operation flow in one paragraph: accept validates, scans recent snippets
//! for a byte-identical duplicate, checks the quota and the word ceiling,
//! reserves a scheduler slot, inserts the metadata row (`PROCESSING`),
//! pushes the id onto the recency queue, and hands `(id, content)` to the
//! scheduler; the caller gets the id back immediately. A worker then chunks
//! and compresses the content, batch-inserts the chunk rows, and flips the
//! row to `COMPLETED` (or `FAILED`; the error never reaches a client).
//! Reads fuse the queue's ordering with one bulk chunk query and parallel
//! decompression.
//!
//! Quickstart
//! ```rust,ignore
//! use clipvault_core::{EngineLimits, UserId, UserRole};
//! use clipvault_db::Database;
//! use clipvault_recency::InMemoryRecencyQueue;
//! use clipvault_service::SnippetService;
//! use std::sync::Arc;
//!
//! # async fn example() -> clipvault_error::Result<()> {
//! let db = Database::connect("sqlite::memory:").await?;
//! let owner = db.insert_user("me@example.com", UserRole::Ordinary).await?.id;
//! let limits = EngineLimits::default();
//! let queue = Arc::new(InMemoryRecencyQueue::new(limits.recency_cap));
//! let service = SnippetService::new(db, queue, limits, 256);
//!
//! let accepted = service.accept(owner, "hello world", None).await?;
//! // Processing is asynchronous; the accept response carries only the id.
//! assert!(accepted.content.is_empty());
//!
//! // Once the background job completes, content round-trips.
//! let fetched = service.fetch_one(owner, accepted.id).await?;
//! assert_eq!(fetched.content, "hello world");
//! # Ok(()) }
//! ```
//!
//! Concurrency
//! - One process-wide worker pool (sized by
//!   [`EngineLimits::worker_pool_size`](clipvault_core::EngineLimits))
//!   bounds every compress, decompress, and search job; request handlers
//!   submit work and await completion.
//! - The scheduler is a separate bounded queue so a processing backlog never
//!   stalls reads; accept reserves its slot before any side effect and
//!   rejects with `Busy` when the queue is full.
//! - Two concurrent accepts of the same content can both pass the duplicate
//!   scan; the later duplicate lands. This race is tolerated by contract.
//!
//! Failure posture
//! - Recency queue errors degrade: reads serve best-effort (empty on
//!   failure), the delete path commits the metadata flip regardless, and
//!   only `touch` (whose sole effect is the queue write) surfaces them.
//! - A corrupt stored payload skips that snippet in batched reads and is an
//!   error only for single-snippet fetch.
//! - Background processing errors are absorbed into the `FAILED` status and
//!   logged with the snippet id; the client that accepted is unaffected.
//!
//! Observability
//! - Accepted/deleted snippets log at `info` with `snippet_id` and `owner`;
//!   degraded queue operations log at `warn`; processing completion logs at
//!   `debug` with the chunk count.

mod scheduler;
mod service;
mod validation;

pub use scheduler::{JobQueue, JobSlot, ProcessJob};
pub use service::{SnippetService, SnippetView};
pub use validation::estimate_words;
