use clipvault_error::InternalError;
use std::sync::Arc;

#[derive(Debug, Clone, thiserror::Error)]
pub enum QueueError {
    #[error("redis error: {0}")]
    Redis(#[source] Arc<redis::RedisError>),

    #[error("recency queue operation {op} timed out after {ms} ms")]
    Timeout { op: &'static str, ms: u64 },
}

impl From<redis::RedisError> for QueueError {
    fn from(e: redis::RedisError) -> Self {
        QueueError::Redis(Arc::new(e))
    }
}

impl From<QueueError> for clipvault_error::Error {
    fn from(e: QueueError) -> Self {
        InternalError::queue(e).into()
    }
}
