//! Per-query hybrid search: concurrent lexical and vector retrieval fused
//! by Reciprocal Rank Fusion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use grounding_core::{
    Chunk, ChunkStore, Embedder, EmbeddingFailurePolicy, EmbeddingTask, LexicalHit, LexicalIndex,
    Result, RetrievalConfig, RetrievalError, VectorHit, VectorIndex,
};

use crate::fusion::{fuse, select_top_k};
use crate::materialize::materialize_chunks;

/// Drives the lexical and vector searches for a single query, fuses their
/// rankings, selects a bounded top-K and materializes the surviving chunks.
///
/// All per-query state (rank maps, document cache, selection heap) is local
/// to one `run` call; the unit itself only holds shared read-only handles,
/// so one unit can serve many concurrent queries.
pub struct HybridSearchUnit<S, L, V, E> {
    store: Arc<S>,
    lexical: Arc<L>,
    vector: Arc<V>,
    embedder: Arc<E>,
    config: Arc<RetrievalConfig>,
}

impl<S, L, V, E> Clone for HybridSearchUnit<S, L, V, E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            lexical: Arc::clone(&self.lexical),
            vector: Arc::clone(&self.vector),
            embedder: Arc::clone(&self.embedder),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, L, V, E> HybridSearchUnit<S, L, V, E>
where
    S: ChunkStore,
    L: LexicalIndex,
    V: VectorIndex,
    E: Embedder,
{
    pub fn new(
        store: Arc<S>,
        lexical: Arc<L>,
        vector: Arc<V>,
        embedder: Arc<E>,
        config: Arc<RetrievalConfig>,
    ) -> Self {
        Self {
            store,
            lexical,
            vector,
            embedder,
            config,
        }
    }

    /// Run the hybrid search for one query.
    ///
    /// Engine failures degrade to an empty hit set for that engine; an
    /// embedding failure follows the configured
    /// [`EmbeddingFailurePolicy`]. Returns the fused ranking best-to-worst,
    /// at most `fusion.max_chunks` entries.
    pub async fn run(&self, query: &str, cancel: &CancellationToken) -> Result<Vec<Chunk>> {
        let (lexical_result, vector_result) = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RetrievalError::Cancelled),
            results = async {
                tokio::join!(self.lexical_leg(query), self.vector_leg(query))
            } => results,
        };

        let (lexical_ranks, cache) = match lexical_result {
            Ok(hits) => collect_lexical_ranks(hits),
            Err(err) => {
                warn!(query, error = %err, "lexical search failed, continuing without it");
                (HashMap::new(), HashMap::new())
            }
        };

        let vector_ranks = match vector_result {
            Ok(hits) => collect_vector_ranks(hits),
            Err(err @ RetrievalError::Embedding { .. }) => {
                match self.config.batch.on_embedding_failure {
                    EmbeddingFailurePolicy::Fail => return Err(err),
                    EmbeddingFailurePolicy::LexicalOnly => {
                        warn!(query, error = %err, "query embedding failed, degrading to lexical-only");
                        HashMap::new()
                    }
                }
            }
            Err(err) => {
                warn!(query, error = %err, "vector search failed, continuing without it");
                HashMap::new()
            }
        };

        let scores = fuse(&self.config.fusion, &lexical_ranks, &vector_ranks);
        let ranked = select_top_k(scores, self.config.fusion.max_chunks);
        debug!(
            query,
            lexical = lexical_ranks.len(),
            vector = vector_ranks.len(),
            selected = ranked.len(),
            "fused engine rankings"
        );

        let ranked_ids: Vec<String> = ranked.into_iter().map(|(id, _)| id).collect();
        Ok(materialize_chunks(self.store.as_ref(), cache, ranked_ids).await)
    }

    async fn lexical_leg(&self, query: &str) -> Result<Vec<LexicalHit>> {
        if !self.config.lexical.enabled {
            return Ok(Vec::new());
        }
        self.lexical
            .search(query, &self.config.lexical.params())
            .await
    }

    async fn vector_leg(&self, query: &str) -> Result<Vec<VectorHit>> {
        if !self.config.vector.enabled {
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed(query, EmbeddingTask::Query).await?;
        self.vector
            .search(&embedding, &self.config.vector.params())
            .await
    }
}

/// Convert lexical hits to an id→rank map (1-based, first occurrence wins)
/// and a document cache for later materialization.
fn collect_lexical_ranks(
    hits: Vec<LexicalHit>,
) -> (HashMap<String, usize>, HashMap<String, Chunk>) {
    let mut ranks = HashMap::new();
    let mut cache = HashMap::new();
    for (i, hit) in hits.into_iter().enumerate() {
        let id = hit.chunk.chunk_id.clone();
        if !ranks.contains_key(&id) {
            ranks.insert(id.clone(), i + 1);
            cache.insert(id, hit.chunk);
        }
    }
    (ranks, cache)
}

/// Convert vector hits to an id→rank map (1-based, first occurrence wins).
fn collect_vector_ranks(hits: Vec<VectorHit>) -> HashMap<String, usize> {
    let mut ranks = HashMap::new();
    for (i, hit) in hits.into_iter().enumerate() {
        ranks.entry(hit.chunk_id).or_insert(i + 1);
    }
    ranks
}
