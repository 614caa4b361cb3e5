use crate::ids::{SnippetId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Processing state of a snippet.
///
/// A snippet is created as `Processing` during accept and transitions exactly
/// once: to `Completed` when its chunks have been persisted, or to `Failed`
/// when the background job errors. Soft deletion is orthogonal and tracked on
/// the snippet row itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnippetStatus {
    Processing,
    Completed,
    Failed,
}

impl SnippetStatus {
    /// Stable string form used for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SnippetStatus::Processing => "PROCESSING",
            SnippetStatus::Completed => "COMPLETED",
            SnippetStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for SnippetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized snippet status: {0:?}")]
pub struct StatusParseError(pub String);

impl FromStr for SnippetStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROCESSING" => Ok(SnippetStatus::Processing),
            "COMPLETED" => Ok(SnippetStatus::Completed),
            "FAILED" => Ok(SnippetStatus::Failed),
            other => Err(StatusParseError(other.to_string())),
        }
    }
}

/// Snippet metadata as persisted in the store. The plaintext itself lives in
/// chunk rows and is only materialized on retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: SnippetId,
    pub owner: UserId,
    pub source_url: Option<String>,
    /// Number of chunk rows; 0 until processing completes.
    pub total_chunks: u32,
    /// Byte count of the original plaintext.
    pub total_size: u64,
    pub is_deleted: bool,
    pub status: SnippetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One persisted slice of a snippet's payload.
///
/// `content` is opaque bytes, compressed when `is_compressed` is set.
/// Chunks are written once and never updated; uniqueness is
/// `(snippet_id, chunk_index)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub id: i64,
    pub snippet_id: SnippetId,
    pub chunk_index: u32,
    pub content: Vec<u8>,
    pub is_compressed: bool,
    pub content_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Output of the save pipeline: an ordered, dense-by-index piece of a
/// snippet, ready for batch insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedChunk {
    pub index: u32,
    pub content: Vec<u8>,
    pub is_compressed: bool,
    /// Hex digest of `content` as stored, for offline integrity checks.
    pub content_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            SnippetStatus::Processing,
            SnippetStatus::Completed,
            SnippetStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<SnippetStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("DONE".parse::<SnippetStatus>().is_err());
    }
}
