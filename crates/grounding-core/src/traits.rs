//! Traits defining the seams to the external search collaborators.
//!
//! The lexical index, vector index, embedder and chunk store are owned by
//! other subsystems; this engine only consumes them behind these traits.
//! Implementations must be safe for concurrent shared use.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Chunk, LexicalHit, VectorHit};

/// Task hint for asymmetric retrieval embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingTask {
    Query,
    Passage,
}

impl EmbeddingTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Passage => "passage",
        }
    }
}

/// Parameters for a lexical (term) search.
#[derive(Debug, Clone)]
pub struct LexicalSearchParams {
    /// Name of the full-text index to query.
    pub index_name: String,

    /// Document fields the index matches against.
    pub search_paths: Vec<String>,

    /// Maximum number of hits to return.
    pub limit: usize,
}

/// Parameters for a vector (approximate nearest neighbour) search.
#[derive(Debug, Clone)]
pub struct VectorSearchParams {
    /// Name of the vector index to query.
    pub index_name: String,

    /// Document field holding the embedding.
    pub field: String,

    /// Number of hits to return.
    pub k: usize,

    /// Candidates the index considers internally before returning top-k.
    pub candidate_pool: usize,
}

/// Full-text index returning ranked hits with documents attached.
///
/// Failures are reported as [`RetrievalError::LexicalSearch`].
///
/// [`RetrievalError::LexicalSearch`]: crate::error::RetrievalError::LexicalSearch
#[async_trait]
pub trait LexicalIndex: Send + Sync {
    /// Ranked hits, best first. Documents are fully populated.
    async fn search(&self, query: &str, params: &LexicalSearchParams) -> Result<Vec<LexicalHit>>;
}

/// Vector index returning ranked hits with identity and score only.
///
/// Failures are reported as [`RetrievalError::VectorSearch`].
///
/// [`RetrievalError::VectorSearch`]: crate::error::RetrievalError::VectorSearch
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Ranked hits, best first. Document bodies are not populated.
    async fn search(&self, embedding: &[f32], params: &VectorSearchParams)
        -> Result<Vec<VectorHit>>;
}

/// Text to fixed-dimension vector.
///
/// Failures are reported as [`RetrievalError::Embedding`].
///
/// [`RetrievalError::Embedding`]: crate::error::RetrievalError::Embedding
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str, task: EmbeddingTask) -> Result<Vec<f32>>;
}

/// Document store keyed by chunk identity.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Resolve many chunk ids in a single round trip.
    ///
    /// Unknown ids are silently absent from the result.
    async fn find_by_ids(&self, ids: &HashSet<String>) -> Result<Vec<Chunk>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_task_str() {
        assert_eq!(EmbeddingTask::Query.as_str(), "query");
        assert_eq!(EmbeddingTask::Passage.as_str(), "passage");
    }
}
