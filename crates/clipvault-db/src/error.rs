use clipvault_error::InternalError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("stored row is malformed: {0}")]
    MalformedRow(String),
}

impl From<DbError> for clipvault_error::Error {
    fn from(e: DbError) -> Self {
        // The structured source is logged at the call site; the workspace
        // error carries the rendered message only.
        InternalError::store(e).into()
    }
}
