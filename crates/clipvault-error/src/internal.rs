/// Infrastructure failures: the metadata store, the recency queue, or a
/// worker task failed in a way no request-level policy covers.
///
/// Messages are pre-rendered strings so the type stays `Clone` across crate
/// boundaries; the originating crate logs the structured source before
/// converting.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InternalError {
    #[error("metadata store error: {0}")]
    Store(String),

    #[error("recency queue error: {0}")]
    Queue(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

impl InternalError {
    pub fn store(msg: impl std::fmt::Display) -> Self {
        InternalError::Store(msg.to_string())
    }

    pub fn queue(msg: impl std::fmt::Display) -> Self {
        InternalError::Queue(msg.to_string())
    }

    pub fn task(msg: impl std::fmt::Display) -> Self {
        InternalError::Task(msg.to_string())
    }
}
