use crate::error::PipelineError;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Process-wide bound on concurrent CPU-heavy jobs.
///
/// One pool is created at startup and shared by every pipeline fan-out:
/// per-chunk compression on save, per-chunk decompression on retrieval, and
/// the per-chunk scans of streaming search. Jobs run on tokio's blocking
/// thread pool, gated by a semaphore permit so at most `permits` of them
/// execute at once. Excess jobs queue on the semaphore; nothing is rejected
/// here, backpressure on accepts is the scheduler's concern.
///
/// The pool holds no threads of its own and keeps nothing alive: dropping
/// the last clone releases the semaphore and the runtime's blocking threads
/// wind down with the process.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
}

impl WorkerPool {
    pub fn new(permits: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(permits.max(1))),
        }
    }

    /// Run one blocking job under a permit and return its output.
    pub async fn run<F, T>(&self, job: F) -> Result<T, PipelineError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PipelineError::PoolClosed)?;
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "pipeline job did not complete");
            PipelineError::Task(e.to_string())
        })
    }

    /// Permits currently not held by running jobs.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}
