//! clipvault-error — workspace-wide error types and their user-facing
//! classification.
//!
//! A single [`Error`] enum is shared across crates. Library code returns
//! `clipvault_error::Result<T>` and propagates with `?`; per-crate error
//! enums convert in via `From`. The edge classifies errors with
//! [`Error::kind`] and maps kinds to HTTP statuses with
//! [`ErrorKind::http_status`], so no library crate ever reasons about
//! transport concerns.
//!
//! Guidance
//! - Prefer structured variants ([`ValidationError`], [`InternalError`]) over
//!   ad-hoc strings.
//! - Emission/logging happens at boundaries (service, server), not inside
//!   leaf crates.

pub mod internal;
pub mod kind;
pub mod validation;

pub use internal::InternalError;
pub use kind::ErrorKind;
pub use validation::ValidationError;

/// Workspace-wide result alias used by all crates in the project.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type used across the clipvault workspace.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Request rejected before any side effect: empty/oversized content,
    /// overlong source URL, empty search query, word limit.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The owner is at their snippet quota.
    #[error("snippet quota exceeded: {current} of {max}")]
    QuotaExceeded { current: u64, max: u64 },

    /// Content is byte-identical to a recent non-deleted snippet.
    #[error("content duplicates a recent snippet")]
    Duplicate,

    /// Snippet absent, owned by someone else, or soft-deleted. The three are
    /// indistinguishable on purpose: existence is not disclosed.
    #[error("snippet not found")]
    NotFound,

    /// Snippet exists but its chunks have not been persisted yet.
    #[error("snippet is still processing")]
    NotReady,

    /// Stored bytes failed to decompress or decode during a read.
    #[error("stored payload is corrupt: {0}")]
    CorruptPayload(String),

    /// The async scheduler queue is full; the accept was rejected before any
    /// side effect.
    #[error("service is busy, retry later")]
    Busy,

    /// Store/queue I/O or task failure not classified above.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    /// Coarse classification for programmatic handling at boundaries.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::BadRequest,
            Error::QuotaExceeded { .. } => ErrorKind::QuotaExceeded,
            Error::Duplicate => ErrorKind::Duplicate,
            Error::NotFound => ErrorKind::NotFound,
            Error::NotReady => ErrorKind::NotReady,
            Error::CorruptPayload(_) => ErrorKind::CorruptPayload,
            Error::Busy => ErrorKind::Busy,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for failures a client can repair by changing the request.
    pub fn is_client_error(&self) -> bool {
        self.kind().http_status() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_documented_statuses() {
        assert_eq!(
            Error::Validation(ValidationError::EmptyContent)
                .kind()
                .http_status(),
            400
        );
        assert_eq!(
            Error::QuotaExceeded { current: 3, max: 3 }.kind().http_status(),
            400
        );
        assert_eq!(Error::Duplicate.kind().http_status(), 409);
        assert_eq!(Error::NotFound.kind().http_status(), 404);
        assert_eq!(Error::NotReady.kind().http_status(), 404);
        assert_eq!(
            Error::CorruptPayload("bad gzip".into()).kind().http_status(),
            500
        );
        assert_eq!(Error::Busy.kind().http_status(), 503);
        assert_eq!(
            Error::Internal(InternalError::store("boom")).kind().http_status(),
            500
        );
    }

    #[test]
    fn client_errors_are_distinguished() {
        assert!(Error::Duplicate.is_client_error());
        assert!(!Error::Internal(InternalError::store("io")).is_client_error());
    }
}
