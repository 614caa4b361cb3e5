//! clipvault-pipeline — chunk, compress, and search primitives for snippet
//! payloads.
//!
//! The pipeline owns the CPU-heavy half of the storage engine. It exposes
//! four primitives, all fanning out over one process-wide bounded worker
//! pool:
//!
//! - [`Pipeline::for_save`]: split a plaintext into fixed-size pieces and
//!   compress each piece in parallel, producing a dense, index-ordered list
//!   ready for batch insertion.
//! - [`Pipeline::for_retrieval`]: decompress and reassemble one snippet's
//!   chunks back into text.
//! - [`Pipeline::for_retrieval_parallel`]: apply retrieval to many snippets
//!   concurrently, preserving input order and isolating per-snippet failures.
//! - [`Pipeline::search_streaming`]: decide whether a query occurs in the
//!   plaintext without reassembling it, via per-chunk containment plus a
//!   bounded cross-boundary window pass.
//!
//! Key properties
//! - Bounded concurrency: every compress/decompress job acquires a permit
//!   from a shared [`WorkerPool`] before running on the blocking thread pool,
//!   so a burst of large snippets cannot monopolize the process.
//! - Order by index, never by completion: fan-outs join all jobs and restore
//!   the caller's ordering.
//! - Pure transforms: jobs hold no external state, so a caller dropping a
//!   future mid-flight leaves nothing to clean up.
//!
//! Error model
//! - Invalid gzip streams and non-UTF-8 plaintext surface as
//!   [`PipelineError::Corrupt`], which maps to the workspace
//!   `CorruptPayload` kind.
//! - Empty inputs surface as [`PipelineError::EmptyInput`]; callers are
//!   expected to have validated, so the workspace mapping treats it as an
//!   invalid state rather than a user error.

mod chunk;
mod compress;
mod error;
mod pipeline;
mod pool;

pub use chunk::{reassemble, split};
pub use compress::{compress, decompress};
pub use error::PipelineError;
pub use pipeline::{Pipeline, RetrievalInput};
pub use pool::WorkerPool;
