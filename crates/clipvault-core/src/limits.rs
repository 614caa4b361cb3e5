use crate::{DEFAULT_CHUNK_SIZE_BYTES, DEFAULT_WORKER_POOL_SIZE};
use serde::{Deserialize, Serialize};

/// Engine knobs shared by the pipeline, the coordinator, and the edge.
///
/// Every field has a serde default so a partial config file only overrides
/// what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Hard cap on accepted content, in bytes.
    pub max_snippet_bytes: usize,
    /// Hard cap on the optional source URL, in bytes.
    pub max_source_url_bytes: usize,
    /// Word-count ceiling enforced by accept-time validation.
    pub max_words: u64,
    /// Inputs larger than this skip word counting entirely.
    pub word_validation_skip_bytes: usize,
    /// At most this many bytes are scanned when estimating the word count;
    /// longer inputs are extrapolated linearly.
    pub word_scan_limit_bytes: usize,
    /// Per-user ceiling on non-deleted snippets.
    pub max_snippets_per_user: u64,
    /// Length the per-user recency list is truncated to.
    pub recency_cap: usize,
    /// Most-recent snippets considered by content search.
    pub search_max_snippets: usize,
    /// Split size for the chunk pipeline.
    pub chunk_size_bytes: usize,
    /// Permits on the shared compress/decompress pool.
    pub worker_pool_size: usize,
    /// Recent snippets inspected by the accept-time duplicate scan.
    pub duplicate_scan_depth: usize,
    /// Cap on the cross-chunk overlap window used by streaming search.
    /// Queries longer than this plus one byte can be missed across a chunk
    /// boundary; this is accepted in exchange for bounded work.
    pub boundary_overlap_cap: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_snippet_bytes: 20_000_000,
            max_source_url_bytes: 2048,
            max_words: 3_000_000,
            word_validation_skip_bytes: 5_000_000,
            word_scan_limit_bytes: 1_000_000,
            max_snippets_per_user: 1000,
            recency_cap: 50,
            search_max_snippets: 100,
            chunk_size_bytes: DEFAULT_CHUNK_SIZE_BYTES,
            worker_pool_size: DEFAULT_WORKER_POOL_SIZE,
            duplicate_scan_depth: 50,
            boundary_overlap_cap: 100,
        }
    }
}
