//! clipvault-core — shared domain types for the clipvault workspace.
//!
//! This crate holds the types that cross crate boundaries: identifiers,
//! snippet and chunk models, the snippet status machine, user records, and
//! the engine limits every component reads its knobs from. It deliberately
//! carries no I/O dependencies so that every other crate can depend on it.

mod ids;
mod limits;
mod snippet;
mod user;

pub use ids::{SnippetId, UserId};
pub use limits::EngineLimits;
pub use snippet::{Chunk, ProcessedChunk, Snippet, SnippetStatus, StatusParseError};
pub use user::{User, UserRole};

/// Default chunk size in bytes for the split/compress pipeline.
pub const DEFAULT_CHUNK_SIZE_BYTES: usize = 65_536;

/// Default bound on concurrent compress/decompress jobs.
pub const DEFAULT_WORKER_POOL_SIZE: usize = 10;
