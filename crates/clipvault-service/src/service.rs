use crate::scheduler::{JobQueue, ProcessJob};
use crate::validation;
use chrono::{DateTime, Utc};
use clipvault_core::{Chunk, EngineLimits, Snippet, SnippetId, SnippetStatus, UserId};
use clipvault_db::Database;
use clipvault_error::{Error, Result, ValidationError};
use clipvault_pipeline::{Pipeline, PipelineError, RetrievalInput, WorkerPool};
use clipvault_recency::RecencyQueue;
use futures::future::join_all;
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Orchestration jobs spend most of their time awaiting the pipeline's own
/// bounded pool, so a handful of drain tasks is plenty.
const SCHEDULER_WORKERS: usize = 4;

/// What a caller gets back for one snippet. `content` is empty on accept
/// (clients fetch it back explicitly) and for snippets whose chunks are not
/// persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetView {
    pub id: SnippetId,
    pub content: String,
    pub source_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The storage engine's coordinator. One instance per process, shared
/// behind `Arc` by every request handler.
pub struct SnippetService {
    db: Database,
    queue: Arc<dyn RecencyQueue>,
    pipeline: Pipeline,
    scheduler: JobQueue,
    limits: EngineLimits,
}

impl SnippetService {
    pub fn new(
        db: Database,
        queue: Arc<dyn RecencyQueue>,
        limits: EngineLimits,
        scheduler_depth: usize,
    ) -> Self {
        let pool = WorkerPool::new(limits.worker_pool_size);
        let pipeline = Pipeline::new(pool, limits.chunk_size_bytes, limits.boundary_overlap_cap);
        let scheduler = JobQueue::spawn(
            db.clone(),
            pipeline.clone(),
            scheduler_depth,
            SCHEDULER_WORKERS,
        );
        Self {
            db,
            queue,
            pipeline,
            scheduler,
            limits,
        }
    }

    pub fn limits(&self) -> &EngineLimits {
        &self.limits
    }

    /// Accept a snippet: validate, reject duplicates and quota breaches,
    /// persist the metadata row, push recency, queue background processing.
    /// Returns immediately with the id; the content field is empty by
    /// contract.
    pub async fn accept(
        &self,
        owner: UserId,
        content: &str,
        source_url: Option<&str>,
    ) -> Result<SnippetView> {
        validation::validate_content(content, &self.limits)?;
        validation::validate_source_url(source_url, &self.limits)?;

        self.check_duplicate(owner, content).await?;
        self.check_quota(owner).await?;
        validation::validate_word_count(content, &self.limits)?;

        // Reserve the scheduler slot before any side effect: a full queue
        // must reject without leaving a PROCESSING row no worker will visit.
        let slot = self.scheduler.reserve()?;

        let snippet = self
            .db
            .insert_snippet(owner, source_url, content.len() as u64)
            .await
            .map_err(Error::from)?;

        // Post-commit steps are best-effort; the snippet is already durable.
        if let Err(e) = self.queue.push_front(owner, snippet.id).await {
            tracing::warn!(snippet_id = %snippet.id, %owner, error = %e,
                "recency push failed on accept");
        }

        slot.submit(ProcessJob {
            snippet_id: snippet.id,
            owner,
            content: content.to_string(),
        });

        tracing::info!(snippet_id = %snippet.id, %owner, size_bytes = content.len(),
            "snippet accepted");
        Ok(view(snippet, String::new()))
    }

    /// The caller's working set: recency-queue order fused with one bulk
    /// chunk read and parallel decompression.
    pub async fn fetch_recent(&self, owner: UserId) -> Result<Vec<SnippetView>> {
        let ids = match self.queue.recent(owner).await {
            Ok(ids) => ids,
            Err(e) => {
                // Queue reads degrade: serve best-effort rather than fail.
                tracing::warn!(%owner, error = %e, "recency read failed, serving empty");
                return Ok(Vec::new());
            }
        };
        // Racing push/move can leave duplicate ids; first occurrence wins.
        let ids: Vec<SnippetId> = ids.into_iter().unique().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = self
            .db
            .find_chunks_for_snippets(&ids)
            .await
            .map_err(Error::from)?;
        let mut grouped = group_by_snippet(chunks);

        let metas: HashMap<SnippetId, Snippet> = self
            .db
            .find_snippets_by_ids(&ids)
            .await
            .map_err(Error::from)?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        // Pair each queue id with its metadata and (optionally) a retrieval
        // input, preserving queue order throughout.
        let mut entries: Vec<(Snippet, Option<usize>)> = Vec::new();
        let mut inputs: Vec<RetrievalInput> = Vec::new();
        for id in &ids {
            let Some(meta) = metas.get(id) else {
                tracing::warn!(snippet_id = %id, %owner, "recency id without metadata row");
                continue;
            };
            if meta.is_deleted {
                continue;
            }
            match grouped.remove(id) {
                Some(snippet_chunks) if !snippet_chunks.is_empty() => {
                    entries.push((meta.clone(), Some(inputs.len())));
                    inputs.push(retrieval_input(snippet_chunks));
                }
                // Still processing, or failed: returned with empty content.
                _ => entries.push((meta.clone(), None)),
            }
        }

        let mut results = self.pipeline.for_retrieval_parallel(inputs).await;

        let mut out = Vec::with_capacity(entries.len());
        for (meta, slot) in entries {
            let content = match slot {
                None => String::new(),
                Some(i) => match std::mem::replace(&mut results[i], Ok(String::new())) {
                    Ok(text) => text,
                    Err(PipelineError::Corrupt { detail }) => {
                        tracing::warn!(snippet_id = %meta.id, detail,
                            "skipping corrupt snippet in batched retrieval");
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                },
            };
            out.push(view(meta, content));
        }
        Ok(out)
    }

    pub async fn fetch_one(&self, owner: UserId, id: SnippetId) -> Result<SnippetView> {
        let snippet = self
            .db
            .find_snippet_by_id_and_owner(id, owner)
            .await
            .map_err(Error::from)?
            .ok_or(Error::NotFound)?;
        if snippet.is_deleted {
            // Deleted snippets do not disclose their existence.
            return Err(Error::NotFound);
        }

        let chunks = self
            .db
            .find_chunks_by_snippet(id)
            .await
            .map_err(Error::from)?;
        if chunks.is_empty() {
            return Err(match snippet.status {
                SnippetStatus::Processing => Error::NotReady,
                _ => Error::NotFound,
            });
        }

        let content = self.pipeline.for_retrieval(retrieval_input(chunks)).await?;

        if let Err(e) = self.queue.move_to_front(owner, id).await {
            tracing::warn!(snippet_id = %id, %owner, error = %e,
                "move-to-front failed after fetch");
        }

        Ok(view(snippet, content))
    }

    /// Substring search over the owner's most recent snippets. Non-matching
    /// snippets are never reassembled; matches are returned in recency
    /// (candidate) order.
    pub async fn search(&self, owner: UserId, query: &str) -> Result<Vec<SnippetView>> {
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery.into());
        }

        let candidates = self
            .db
            .find_recent_non_deleted(owner, self.limits.search_max_snippets)
            .await
            .map_err(Error::from)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<SnippetId> = candidates.iter().map(|s| s.id).collect();
        let chunks = self
            .db
            .find_chunks_for_snippets(&ids)
            .await
            .map_err(Error::from)?;
        let mut grouped = group_by_snippet(chunks);

        let jobs = candidates.into_iter().map(|meta| {
            let snippet_chunks = grouped.remove(&meta.id).unwrap_or_default();
            let pipeline = self.pipeline.clone();
            let query = query.as_bytes().to_vec();
            async move {
                if snippet_chunks.is_empty() {
                    return Ok(None);
                }
                let input = retrieval_input(snippet_chunks);
                match pipeline.search_streaming(input.clone(), &query).await {
                    Ok(true) => {}
                    Ok(false) => return Ok(None),
                    Err(PipelineError::Corrupt { detail }) => {
                        tracing::warn!(snippet_id = %meta.id, detail,
                            "skipping corrupt snippet in search");
                        return Ok(None);
                    }
                    Err(e) => return Err(Error::from(e)),
                }
                match pipeline.for_retrieval(input).await {
                    Ok(text) => Ok(Some(view(meta, text))),
                    Err(PipelineError::Corrupt { detail }) => {
                        tracing::warn!(detail, "snippet matched but failed reassembly");
                        Ok(None)
                    }
                    Err(e) => Err(Error::from(e)),
                }
            }
        });

        let mut out = Vec::new();
        for result in join_all(jobs).await {
            if let Some(hit) = result? {
                out.push(hit);
            }
        }
        Ok(out)
    }

    /// Soft delete. The metadata flip commits even when the recency removal
    /// fails; the queue converges on the next read.
    pub async fn delete(&self, owner: UserId, id: SnippetId) -> Result<()> {
        let snippet = self
            .db
            .find_snippet_by_id_and_owner(id, owner)
            .await
            .map_err(Error::from)?
            .ok_or(Error::NotFound)?;
        if snippet.is_deleted {
            return Err(Error::NotFound);
        }

        self.db.mark_deleted(id).await.map_err(Error::from)?;

        if let Err(e) = self.queue.remove(owner, id).await {
            tracing::warn!(snippet_id = %id, %owner, error = %e,
                "recency removal failed, metadata delete committed");
        }
        tracing::info!(snippet_id = %id, %owner, "snippet deleted");
        Ok(())
    }

    /// Recency-only access: bump the snippet to the front of the working
    /// set without returning its content.
    pub async fn touch(&self, owner: UserId, id: SnippetId) -> Result<()> {
        let snippet = self
            .db
            .find_snippet_by_id_and_owner(id, owner)
            .await
            .map_err(Error::from)?
            .ok_or(Error::NotFound)?;
        if snippet.is_deleted {
            return Err(Error::NotFound);
        }
        self.queue.move_to_front(owner, id).await?;
        Ok(())
    }

    /// Drain in-flight background jobs and stop the workers.
    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }

    async fn check_duplicate(&self, owner: UserId, content: &str) -> Result<()> {
        let recent = self
            .db
            .find_recent_non_deleted(owner, self.limits.duplicate_scan_depth)
            .await
            .map_err(Error::from)?;

        for candidate in recent {
            // Byte-for-byte equality implies equal length; skip the rest.
            if candidate.total_size != content.len() as u64 {
                continue;
            }
            let chunks = self
                .db
                .find_chunks_by_snippet(candidate.id)
                .await
                .map_err(Error::from)?;
            if chunks.is_empty() {
                // Still processing with nothing persisted yet: skipped, so a
                // duplicate of an in-flight snippet can land. Documented.
                continue;
            }
            match self.pipeline.for_retrieval(retrieval_input(chunks)).await {
                Ok(text) if text == content => return Err(Error::Duplicate),
                Ok(_) => {}
                Err(PipelineError::Corrupt { detail }) => {
                    tracing::warn!(snippet_id = %candidate.id, detail,
                        "unreadable snippet skipped by duplicate scan");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn check_quota(&self, owner: UserId) -> Result<()> {
        let current = self.db.count_non_deleted(owner).await.map_err(Error::from)?;
        if current >= self.limits.max_snippets_per_user {
            return Err(Error::QuotaExceeded {
                current,
                max: self.limits.max_snippets_per_user,
            });
        }
        Ok(())
    }
}

fn view(snippet: Snippet, content: String) -> SnippetView {
    SnippetView {
        id: snippet.id,
        content,
        source_url: snippet.source_url,
        created_at: snippet.created_at,
        updated_at: snippet.updated_at,
    }
}

fn retrieval_input(chunks: Vec<Chunk>) -> RetrievalInput {
    let compressed = chunks.first().map(|c| c.is_compressed).unwrap_or(true);
    RetrievalInput {
        chunks: chunks.into_iter().map(|c| c.content).collect(),
        compressed,
    }
}

/// Group a bulk chunk read by snippet; within each snippet the query's
/// index order is preserved.
fn group_by_snippet(chunks: Vec<Chunk>) -> HashMap<SnippetId, Vec<Chunk>> {
    let mut grouped: HashMap<SnippetId, Vec<Chunk>> = HashMap::new();
    for chunk in chunks {
        grouped.entry(chunk.snippet_id).or_default().push(chunk);
    }
    grouped
}
