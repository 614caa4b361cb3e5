use serde::{Deserialize, Serialize};

/// Coarse, wire-facing classification of an [`Error`](crate::Error).
///
/// Kinds are stable: the HTTP edge serializes them into error payloads and
/// maps them to statuses, so renaming a kind is a breaking API change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    BadRequest,
    QuotaExceeded,
    Duplicate,
    NotFound,
    /// Snippet exists but has no chunks yet. Surfaced as 404 at the edge.
    NotReady,
    CorruptPayload,
    Busy,
    Internal,
}

impl ErrorKind {
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::BadRequest | ErrorKind::QuotaExceeded => 400,
            ErrorKind::NotFound | ErrorKind::NotReady => 404,
            ErrorKind::Duplicate => 409,
            ErrorKind::Busy => 503,
            ErrorKind::CorruptPayload | ErrorKind::Internal => 500,
        }
    }

    /// Short reason phrase used in error payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::QuotaExceeded => "Quota Exceeded",
            ErrorKind::Duplicate => "Duplicate",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::NotReady => "Not Ready",
            ErrorKind::CorruptPayload => "Corrupt Payload",
            ErrorKind::Busy => "Busy",
            ErrorKind::Internal => "Internal Server Error",
        }
    }
}
