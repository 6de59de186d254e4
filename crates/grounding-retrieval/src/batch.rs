//! Multi-query fan-out and result aggregation.

use std::collections::HashSet;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use grounding_core::{
    Chunk, ChunkStore, Embedder, LexicalIndex, Result, RetrievalConfig, RetrievalError,
    VectorIndex,
};

use crate::stitch::NeighborStitcher;
use crate::unit::HybridSearchUnit;

/// Fans a query batch out to one [`HybridSearchUnit`] per query, merges the
/// per-query rankings and stitches in document neighbors.
///
/// The caller's cancellation token propagates to every in-flight engine
/// call; the first fatal unit error cancels the remaining units and fails
/// the batch.
pub struct SearchPipeline<S, L, V, E> {
    unit: HybridSearchUnit<S, L, V, E>,
    stitcher: NeighborStitcher<S>,
    config: Arc<RetrievalConfig>,
}

impl<S, L, V, E> SearchPipeline<S, L, V, E>
where
    S: ChunkStore + 'static,
    L: LexicalIndex + 'static,
    V: VectorIndex + 'static,
    E: Embedder + 'static,
{
    pub fn new(
        store: Arc<S>,
        lexical: Arc<L>,
        vector: Arc<V>,
        embedder: Arc<E>,
        config: RetrievalConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            unit: HybridSearchUnit::new(
                Arc::clone(&store),
                lexical,
                vector,
                embedder,
                Arc::clone(&config),
            ),
            stitcher: NeighborStitcher::new(store),
            config,
        }
    }

    /// Run the whole batch: fan-out, fan-in, dedup, stitch.
    ///
    /// Empty queries are filtered before dispatch and an entirely empty
    /// batch returns an empty list, not an error.
    pub async fn run(&self, queries: &[String], cancel: &CancellationToken) -> Result<Vec<Chunk>> {
        if !self.config.lexical.enabled && !self.config.vector.enabled {
            return Err(RetrievalError::config(
                "both lexical and vector search are disabled",
            ));
        }

        let mut queries: Vec<String> = queries.iter().filter(|q| !q.is_empty()).cloned().collect();
        let max_queries = self.config.batch.max_queries;
        if queries.len() > max_queries {
            warn!(
                submitted = queries.len(),
                max_queries, "query batch truncated"
            );
            queries.truncate(max_queries);
        }
        if queries.is_empty() {
            info!("no usable queries in batch");
            return Ok(Vec::new());
        }

        // One unit per query; a child token lets a failing unit abort its
        // siblings without cancelling the caller's request token.
        let batch_cancel = cancel.child_token();
        let mut handles = Vec::with_capacity(queries.len());
        for query in queries {
            let unit = self.unit.clone();
            let unit_cancel = batch_cancel.clone();
            handles.push(tokio::spawn(async move {
                unit.run(&query, &unit_cancel).await
            }));
        }

        // Fan-in in submission order so aggregation never depends on task
        // completion order.
        let mut per_query: Vec<Vec<Chunk>> = Vec::with_capacity(handles.len());
        let mut first_error: Option<RetrievalError> = None;
        for handle in handles {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(err) => Err(RetrievalError::internal(format!(
                    "search task failed: {err}"
                ))),
            };
            match outcome {
                Ok(chunks) => per_query.push(chunks),
                Err(err) => {
                    if first_error.is_none() {
                        batch_cancel.cancel();
                        first_error = Some(err);
                    }
                }
            }
        }
        if let Some(err) = first_error {
            warn!(error = %err, "hybrid search batch failed");
            return Err(err);
        }

        let merged = dedup_in_order(per_query);
        debug!(chunks = merged.len(), "aggregated query batch");
        Ok(self.stitcher.run(merged).await)
    }
}

/// Flatten per-query lists in query-submission order, keeping the first
/// occurrence of every chunk id: the best hit from the earliest query that
/// surfaced it.
fn dedup_in_order(per_query: Vec<Vec<Chunk>>) -> Vec<Chunk> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for chunks in per_query {
        for chunk in chunks {
            if seen.insert(chunk.chunk_id.clone()) {
                merged.push(chunk);
            }
        }
    }
    merged
}
