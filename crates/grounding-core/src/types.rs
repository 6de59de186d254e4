//! Core domain types for the grounding retrieval engine.

use serde::{Deserialize, Serialize};

/// Similarity metric tag for a stored embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    #[default]
    Cosine,
    DotProduct,
    Euclidean,
}

/// A stable-identity fragment of source content.
///
/// Chunks are created by the ingestion pipeline and are read-only here.
/// Identity is a content-derived hash, unique within a tenant/collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// Content-derived stable hash.
    pub chunk_id: String,

    /// Shared by all chunks split from one logical section.
    pub section_id: String,

    /// 0-based window order within the section.
    pub window_index: u32,

    /// Ordered heading titles leading to this chunk.
    pub section_path: Vec<String>,

    /// Title of the source document.
    pub title: String,

    /// Source URI (file://, https://).
    pub source_uri: String,

    /// Tags associated with the chunk; part of the lexical search paths.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Ordered text lines.
    pub sentences: Vec<String>,

    /// Weak reference to the preceding window; may dangle.
    #[serde(default)]
    pub prev_chunk_id: Option<String>,

    /// Weak reference to the following window; may dangle.
    #[serde(default)]
    pub next_chunk_id: Option<String>,
}

impl Chunk {
    /// Derive the stable chunk id from its position and content.
    pub fn derive_id(section_id: &str, window_index: u32, sentences: &[String]) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(section_id.as_bytes());
        hasher.update(&window_index.to_le_bytes());
        for sentence in sentences {
            hasher.update(sentence.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(&hasher.finalize().as_bytes()[..16])
    }

    /// Derive the stable section id shared by all windows of one section.
    pub fn section_id_for(source_uri: &str, section_path: &[String]) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(source_uri.as_bytes());
        for heading in section_path {
            hasher.update(heading.as_bytes());
            hasher.update(b"/");
        }
        hex::encode(&hasher.finalize().as_bytes()[..16])
    }

    /// Full chunk text, one sentence per line.
    pub fn text(&self) -> String {
        self.sentences.join("\n")
    }
}

/// Embedding for one chunk, created after the chunk by the ingestion
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkEmbedding {
    /// Identity of the owning chunk.
    pub chunk_id: String,

    /// Fixed-dimension embedding vector.
    pub vector: Vec<f32>,

    /// Metric the vector index uses for this embedding.
    #[serde(default)]
    pub metric: SimilarityMetric,
}

/// A lexical search hit. The document is fully populated.
#[derive(Debug, Clone)]
pub struct LexicalHit {
    pub chunk: Chunk,
    pub score: f32,
}

/// A vector search hit. Only identity and score are populated.
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub chunk_id: String,
    pub score: f32,
}
