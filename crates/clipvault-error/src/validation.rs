/// Policy failures detected synchronously during accept or search, before
/// any state is touched.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("content must not be empty")]
    EmptyContent,

    #[error("content is {size} bytes, limit is {max}")]
    ContentTooLarge { size: usize, max: usize },

    #[error("source URL is {len} bytes, limit is {max}")]
    SourceUrlTooLong { len: usize, max: usize },

    #[error("search query must not be empty")]
    EmptyQuery,

    #[error("content has an estimated {words} words, limit is {max}")]
    WordLimitExceeded { words: u64, max: u64 },
}
