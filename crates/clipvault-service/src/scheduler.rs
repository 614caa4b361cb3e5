use clipvault_core::{SnippetId, UserId};
use clipvault_db::Database;
use clipvault_error::{Error, InternalError};
use clipvault_pipeline::Pipeline;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError, Permit};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// One post-accept processing job: chunk, compress, persist, flip status.
#[derive(Debug)]
pub struct ProcessJob {
    pub snippet_id: SnippetId,
    pub owner: UserId,
    pub content: String,
}

#[derive(Debug)]
enum WorkerMessage {
    Job(ProcessJob),
    Shutdown,
}

/// Bounded queue feeding a fixed set of background workers.
///
/// Accept reserves a slot *before* committing any side effect, so a full
/// queue rejects with `Busy` instead of stranding a `PROCESSING` row with no
/// job behind it. Workers drain the queue until shutdown; the queue being
/// separate from the request path means a processing backlog never stalls
/// reads.
pub struct JobQueue {
    tx: mpsc::Sender<WorkerMessage>,
    workers: usize,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

/// A reserved scheduler slot. Dropping it releases the slot; submitting
/// cannot fail.
pub struct JobSlot<'a> {
    permit: Permit<'a, WorkerMessage>,
}

impl JobSlot<'_> {
    pub fn submit(self, job: ProcessJob) {
        self.permit.send(WorkerMessage::Job(job));
    }
}

impl JobQueue {
    /// Start `workers` background tasks draining a queue of `depth` slots.
    pub fn spawn(db: Database, pipeline: Pipeline, depth: usize, workers: usize) -> Self {
        let (tx, rx) = mpsc::channel(depth.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let workers = workers.max(1);

        let handles = (0..workers)
            .map(|worker| {
                let rx = rx.clone();
                let processor = Processor {
                    db: db.clone(),
                    pipeline: pipeline.clone(),
                };
                tokio::spawn(async move {
                    loop {
                        let message = rx.lock().await.recv().await;
                        match message {
                            Some(WorkerMessage::Job(job)) => processor.process(job).await,
                            Some(WorkerMessage::Shutdown) | None => break,
                        }
                    }
                    tracing::debug!(worker, "processing worker stopped");
                })
            })
            .collect();

        Self {
            tx,
            workers,
            handles: Mutex::new(handles),
        }
    }

    /// Reserve a slot, failing with `Busy` when the queue is full.
    pub fn reserve(&self) -> Result<JobSlot<'_>, Error> {
        match self.tx.try_reserve() {
            Ok(permit) => Ok(JobSlot { permit }),
            Err(TrySendError::Full(())) => Err(Error::Busy),
            Err(TrySendError::Closed(())) => {
                Err(InternalError::task("scheduler is shut down").into())
            }
        }
    }

    /// Stop accepting work and wait for in-flight jobs to finish. Jobs
    /// already queued ahead of the shutdown markers are still processed.
    pub async fn shutdown(&self) {
        for _ in 0..self.workers {
            if self.tx.send(WorkerMessage::Shutdown).await.is_err() {
                break;
            }
        }
        let handles = std::mem::take(&mut *self.handles.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "processing worker panicked during shutdown");
            }
        }
    }
}

/// The background half of accept. Failures are absorbed here: the snippet
/// flips to `FAILED` and the accept response that already went out stays
/// valid.
struct Processor {
    db: Database,
    pipeline: Pipeline,
}

impl Processor {
    async fn process(&self, job: ProcessJob) {
        let snippet_id = job.snippet_id;
        let owner = job.owner;
        match self.run(job).await {
            Ok(Some(chunk_count)) => {
                tracing::debug!(%snippet_id, %owner, chunk_count, "snippet processing completed");
            }
            Ok(None) => {
                tracing::warn!(%snippet_id, %owner, "snippet row vanished before processing");
            }
            Err(e) => {
                tracing::error!(%snippet_id, %owner, error = %e, "snippet processing failed");
                if let Err(mark_err) = self.db.mark_failed(snippet_id).await {
                    tracing::error!(%snippet_id, error = %mark_err, "could not mark snippet failed");
                }
            }
        }
    }

    async fn run(&self, job: ProcessJob) -> Result<Option<u32>, Error> {
        let processed = self.pipeline.for_save(job.content.as_bytes()).await?;

        // The row was inserted before the job was queued; absence means it
        // was hard-removed underneath us and there is nothing to attach to.
        if self
            .db
            .find_snippet_by_id_and_owner(job.snippet_id, job.owner)
            .await
            .map_err(Error::from)?
            .is_none()
        {
            return Ok(None);
        }

        let chunk_count = processed.len() as u32;
        self.db
            .insert_chunks_batch(job.snippet_id, &processed)
            .await
            .map_err(Error::from)?;
        self.db
            .mark_completed(job.snippet_id, chunk_count)
            .await
            .map_err(Error::from)?;
        Ok(Some(chunk_count))
    }
}
