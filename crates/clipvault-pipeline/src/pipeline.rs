use crate::chunk::{reassemble, split};
use crate::compress::{compress, decompress};
use crate::error::PipelineError;
use crate::pool::WorkerPool;
use clipvault_core::ProcessedChunk;
use futures::future::join_all;

/// One snippet's stored payload handed to the retrieval primitives: chunk
/// contents in ascending `chunk_index` order plus the compression flag.
///
/// Callers are contractually required to supply chunks already ordered by
/// index; the pipeline preserves, never repairs, that order.
#[derive(Debug, Clone)]
pub struct RetrievalInput {
    pub chunks: Vec<Vec<u8>>,
    pub compressed: bool,
}

/// The chunk→compress→persist and load→decompress→reassemble transforms,
/// plus the streaming search primitive. Cheap to clone; all clones share the
/// same [`WorkerPool`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    pool: WorkerPool,
    chunk_size: usize,
    boundary_overlap_cap: usize,
}

impl Pipeline {
    pub fn new(pool: WorkerPool, chunk_size: usize, boundary_overlap_cap: usize) -> Self {
        Self {
            pool,
            chunk_size,
            boundary_overlap_cap,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Transform a plaintext for persistence: split into `chunk_size` pieces
    /// and compress each piece on the worker pool.
    ///
    /// Output indices are dense `{0..k-1}` and sorted; a failed piece fails
    /// the whole save.
    pub async fn for_save(&self, content: &[u8]) -> Result<Vec<ProcessedChunk>, PipelineError> {
        let pieces = split(content, self.chunk_size)?;
        let jobs = pieces.into_iter().enumerate().map(|(idx, piece)| {
            let pool = self.pool.clone();
            async move {
                let packed = pool
                    .run(move || {
                        let packed = compress(&piece)?;
                        let digest = blake3::hash(&packed).to_hex().to_string();
                        Ok::<_, PipelineError>((packed, digest))
                    })
                    .await??;
                Ok::<_, PipelineError>((idx, packed))
            }
        });

        let mut indexed = join_all(jobs)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        // Jobs complete in any order; the stored order is by index.
        indexed.sort_unstable_by_key(|(idx, _)| *idx);

        Ok(indexed
            .into_iter()
            .map(|(idx, (content, digest))| ProcessedChunk {
                index: idx as u32,
                content,
                is_compressed: true,
                content_hash: Some(digest),
            })
            .collect())
    }

    /// Recover one snippet's plaintext from its ordered chunks.
    pub async fn for_retrieval(&self, input: RetrievalInput) -> Result<String, PipelineError> {
        let plain = self.plain_chunks(input).await?;
        let bytes = reassemble(&plain)?;
        String::from_utf8(bytes).map_err(|e| PipelineError::Corrupt {
            detail: format!("decompressed payload is not UTF-8: {e}"),
        })
    }

    /// Apply [`Self::for_retrieval`] to many snippets concurrently.
    ///
    /// Results come back in input order; a snippet whose payload fails to
    /// decompress occupies its position with the error instead of poisoning
    /// the batch.
    pub async fn for_retrieval_parallel(
        &self,
        inputs: Vec<RetrievalInput>,
    ) -> Vec<Result<String, PipelineError>> {
        join_all(inputs.into_iter().map(|input| self.for_retrieval(input))).await
    }

    /// Decide whether `query` occurs in the snippet's plaintext without
    /// reassembling it.
    ///
    /// Two phases: each decompressed chunk is tested for containment, then
    /// each adjacent pair is tested through a boundary window of
    /// `min(|query| - 1, boundary_overlap_cap)` bytes from either side.
    /// Matching is case-sensitive and byte-level. A query longer than
    /// `boundary_overlap_cap + 1` bytes that spans a boundary can be missed;
    /// the cap bounds work on adversarial queries and is a documented
    /// behavior.
    pub async fn search_streaming(
        &self,
        input: RetrievalInput,
        query: &[u8],
    ) -> Result<bool, PipelineError> {
        if query.is_empty() {
            // An empty needle trivially matches, mirroring `str::contains`.
            return Ok(true);
        }

        let slices = self.plain_chunks(input).await?;
        if slices.iter().any(|s| contains(s, query)) {
            return Ok(true);
        }

        let overlap = (query.len() - 1).min(self.boundary_overlap_cap);
        if overlap == 0 {
            return Ok(false);
        }
        for pair in slices.windows(2) {
            let (left, right) = (&pair[0], &pair[1]);
            let tail = &left[left.len().saturating_sub(overlap)..];
            let head = &right[..overlap.min(right.len())];
            let mut window = Vec::with_capacity(tail.len() + head.len());
            window.extend_from_slice(tail);
            window.extend_from_slice(head);
            if contains(&window, query) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Decompress all chunks in parallel, restoring index order.
    async fn plain_chunks(&self, input: RetrievalInput) -> Result<Vec<Vec<u8>>, PipelineError> {
        if !input.compressed {
            return Ok(input.chunks);
        }
        let jobs = input.chunks.into_iter().enumerate().map(|(idx, piece)| {
            let pool = self.pool.clone();
            async move {
                let plain = pool.run(move || decompress(&piece)).await??;
                Ok::<_, PipelineError>((idx, plain))
            }
        });

        let mut indexed = join_all(jobs)
            .await
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        indexed.sort_unstable_by_key(|(idx, _)| *idx);
        Ok(indexed.into_iter().map(|(_, plain)| plain).collect())
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(chunk_size: usize) -> Pipeline {
        Pipeline::new(WorkerPool::new(4), chunk_size, 100)
    }

    async fn saved(p: &Pipeline, content: &[u8]) -> RetrievalInput {
        let processed = p.for_save(content).await.unwrap();
        RetrievalInput {
            chunks: processed.into_iter().map(|c| c.content).collect(),
            compressed: true,
        }
    }

    #[tokio::test]
    async fn save_then_retrieve_is_identity() {
        let p = pipeline(8);
        let long = "abcdefgh".repeat(100);
        for content in ["x", "hello world", long.as_str()] {
            let input = saved(&p, content.as_bytes()).await;
            assert_eq!(p.for_retrieval(input).await.unwrap(), content);
        }
    }

    #[tokio::test]
    async fn save_produces_dense_sorted_indices() {
        let p = pipeline(8);
        let processed = p.for_save(&[b'q'; 20]).await.unwrap();
        assert_eq!(processed.len(), 3);
        let indices: Vec<u32> = processed.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(processed.iter().all(|c| c.is_compressed));
        for chunk in &processed {
            let digest = blake3::hash(&chunk.content).to_hex();
            assert_eq!(chunk.content_hash.as_deref(), Some(digest.as_str()));
        }
    }

    #[tokio::test]
    async fn chunk_plaintexts_concatenate_to_original() {
        let p = pipeline(8);
        let content = b"0123456789abcdefghij";
        let processed = p.for_save(content).await.unwrap();
        let mut restored = Vec::new();
        for chunk in &processed {
            restored.extend_from_slice(&decompress(&chunk.content).unwrap());
        }
        assert_eq!(restored, content);
    }

    #[tokio::test]
    async fn uncompressed_input_skips_decompression() {
        let p = pipeline(8);
        let input = RetrievalInput {
            chunks: vec![b"plain ".to_vec(), b"text".to_vec()],
            compressed: false,
        };
        assert_eq!(p.for_retrieval(input).await.unwrap(), "plain text");
    }

    #[tokio::test]
    async fn corrupt_chunk_fails_retrieval() {
        let p = pipeline(8);
        let input = RetrievalInput {
            chunks: vec![b"not gzip at all".to_vec()],
            compressed: true,
        };
        assert!(matches!(
            p.for_retrieval(input).await,
            Err(PipelineError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn parallel_retrieval_preserves_order_and_isolates_failures() {
        let p = pipeline(8);
        let good_a = saved(&p, b"first snippet").await;
        let bad = RetrievalInput {
            chunks: vec![b"garbage".to_vec()],
            compressed: true,
        };
        let good_b = saved(&p, b"third snippet").await;

        let results = p.for_retrieval_parallel(vec![good_a, bad, good_b]).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap(), "first snippet");
        assert!(results[1].is_err());
        assert_eq!(results[2].as_ref().unwrap(), "third snippet");
    }

    #[tokio::test]
    async fn search_finds_match_within_one_chunk() {
        let p = pipeline(8);
        let input = saved(&p, b"AAAABBBBCCCCDDDD").await;
        assert!(p.search_streaming(input, b"BBB").await.unwrap());
    }

    #[tokio::test]
    async fn search_finds_match_across_chunk_boundary() {
        // Chunks of 8: "AAAABBBB" | "CCCCDDDD"; "BBCC" spans the boundary.
        let p = pipeline(8);
        let input = saved(&p, b"AAAABBBBCCCCDDDD").await;
        assert!(p.search_streaming(input, b"BBCC").await.unwrap());
    }

    #[tokio::test]
    async fn search_misses_absent_query() {
        let p = pipeline(8);
        let input = saved(&p, b"AAAABBBBCCCCDDDD").await;
        assert!(!p.search_streaming(input, b"BBDD").await.unwrap());
    }

    #[tokio::test]
    async fn search_is_case_sensitive() {
        let p = pipeline(8);
        let input = saved(&p, b"Hello World").await;
        assert!(!p.search_streaming(input.clone(), b"hello").await.unwrap());
        assert!(p.search_streaming(input, b"Hello").await.unwrap());
    }

    #[tokio::test]
    async fn long_boundary_spanning_query_may_be_missed() {
        // Overlap is capped at 100 bytes per side, so a query needing more
        // than 100 bytes from one side of a boundary is not found even though
        // the plaintext contains it. Documented behavior.
        let p = Pipeline::new(WorkerPool::new(4), 120, 100);
        let mut content = vec![b'x'; 120]; // chunk 0 is all x
        content.extend_from_slice(&vec![b'y'; 120]); // chunk 1 is all y
        let mut query = vec![b'x'; 110]; // needs 110 bytes from the left side
        query.extend_from_slice(&[b'y'; 10]);
        let input = saved(&p, &content).await;
        assert!(!p.search_streaming(input.clone(), &query).await.unwrap());
        // The full plaintext does contain the query.
        let text = p.for_retrieval(input).await.unwrap();
        assert!(text.as_bytes().windows(query.len()).any(|w| w == query));
    }

    #[tokio::test]
    async fn boundary_query_up_to_cap_plus_one_is_found() {
        // 101 bytes spanning exactly one boundary fits the 100-byte windows.
        let p = Pipeline::new(WorkerPool::new(4), 120, 100);
        let mut content = vec![b'x'; 120];
        content.extend_from_slice(&vec![b'y'; 120]);
        let mut query = vec![b'x'; 50];
        query.extend_from_slice(&[b'y'; 51]); // 101 bytes total
        let input = saved(&p, &content).await;
        assert!(p.search_streaming(input, &query).await.unwrap());
    }

    #[tokio::test]
    async fn search_match_implies_retrieval_contains() {
        let p = pipeline(8);
        let content = b"the quick brown fox jumps over the lazy dog";
        let input = saved(&p, content).await;
        for query in [&b"quick"[..], b"own fox ju", b"g", b"zebra"] {
            let matched = p.search_streaming(input.clone(), query).await.unwrap();
            let text = p.for_retrieval(input.clone()).await.unwrap();
            if matched {
                assert!(text.as_bytes().windows(query.len()).any(|w| w == query));
            }
        }
    }
}
