//! clipvault-db — durable persistence for snippets, chunks, and users.
//!
//! A thin repository layer over an SQLite pool. The store is authoritative
//! for existence: the recency queue may briefly reference snippets that are
//! gone, but nothing is served that this crate cannot produce a row for.
//!
//! Query contracts worth knowing:
//! - [`Database::find_chunks_for_snippets`] is the only bulk chunk read and
//!   is a single round-trip, ordered `(snippet_id ASC, chunk_index ASC)`.
//! - [`Database::find_recent_non_deleted`] orders by `created_at DESC,
//!   id DESC`; the id tiebreak keeps same-timestamp rows stable.
//! - Chunk inserts happen once per snippet, in one transaction.
//! - Status and quota accounting are plain queries on the same tables; there
//!   is no separate counter to drift.

mod database;
mod error;
mod schema;

pub use database::Database;
pub use error::DbError;
