use clipvault_error::InternalError;

/// Failures inside the chunk/compress pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PipelineError {
    /// The input (or every piece of it) was empty. Callers validate content
    /// before reaching the pipeline, so seeing this indicates a caller bug.
    #[error("empty input to chunk pipeline")]
    EmptyInput,

    #[error("chunk size must be non-zero")]
    ZeroChunkSize,

    /// Stored bytes are not a valid stream, or decompressed to non-UTF-8.
    #[error("corrupt payload: {detail}")]
    Corrupt { detail: String },

    /// The worker pool was closed while jobs were outstanding (process
    /// shutdown).
    #[error("worker pool closed")]
    PoolClosed,

    /// A compression job panicked or was cancelled by the runtime.
    #[error("pipeline task failed: {0}")]
    Task(String),
}

impl From<PipelineError> for clipvault_error::Error {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::EmptyInput => {
                InternalError::InvalidState("empty input reached the pipeline").into()
            }
            PipelineError::ZeroChunkSize => {
                InternalError::InvalidState("pipeline configured with zero chunk size").into()
            }
            PipelineError::Corrupt { detail } => clipvault_error::Error::CorruptPayload(detail),
            PipelineError::PoolClosed => InternalError::task("worker pool closed").into(),
            PipelineError::Task(msg) => InternalError::task(msg).into(),
        }
    }
}
