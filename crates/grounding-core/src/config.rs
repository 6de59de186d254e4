//! Configuration types for the retrieval engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::traits::{LexicalSearchParams, VectorSearchParams};

/// Policy applied when query embedding generation fails.
///
/// Engine failures always degrade to an empty hit set for that engine.
/// `LexicalOnly` extends the same tolerance to the embedding call, so the
/// affected query still returns lexical hits; `Fail` aborts the whole batch
/// on the first embedding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingFailurePolicy {
    #[default]
    LexicalOnly,
    Fail,
}

/// Main configuration for the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetrievalConfig {
    /// Rank fusion configuration.
    #[serde(default)]
    pub fusion: FusionConfig,

    /// Lexical engine configuration.
    #[serde(default)]
    pub lexical: LexicalConfig,

    /// Vector engine configuration.
    #[serde(default)]
    pub vector: VectorConfig,

    /// Query batch configuration.
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Reciprocal Rank Fusion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Damping constant; suppresses the influence of low-ranked hits.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,

    /// Weight of the lexical engine's vote.
    #[serde(default = "default_weight")]
    pub lexical_weight: f64,

    /// Weight of the vector engine's vote.
    #[serde(default = "default_weight")]
    pub vector_weight: f64,

    /// Per-query top-K bound on fused results.
    #[serde(default = "default_max_chunks")]
    pub max_chunks: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            rrf_k: 60,
            lexical_weight: 1.0,
            vector_weight: 1.0,
            max_chunks: 20,
        }
    }
}

/// Lexical engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalConfig {
    /// Whether the lexical engine participates in search.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Full-text index name.
    #[serde(default = "default_lexical_index")]
    pub index_name: String,

    /// Document fields the index matches against.
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<String>,

    /// Hits to keep from the engine.
    #[serde(default = "default_engine_k")]
    pub limit: usize,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            index_name: default_lexical_index(),
            search_paths: default_search_paths(),
            limit: 20,
        }
    }
}

impl LexicalConfig {
    /// Build the search parameters passed to the lexical index.
    pub fn params(&self) -> LexicalSearchParams {
        LexicalSearchParams {
            index_name: self.index_name.clone(),
            search_paths: self.search_paths.clone(),
            limit: self.limit,
        }
    }
}

/// Vector engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Whether the vector engine participates in search.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Vector index name.
    #[serde(default = "default_vector_index")]
    pub index_name: String,

    /// Document field holding the embedding.
    #[serde(default = "default_vector_field")]
    pub field: String,

    /// Hits to keep from the engine.
    #[serde(default = "default_engine_k")]
    pub k: usize,

    /// Nearest-neighbour candidates considered before returning top-k.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            index_name: default_vector_index(),
            field: default_vector_field(),
            k: 20,
            candidate_pool: 100,
        }
    }
}

impl VectorConfig {
    /// Build the search parameters passed to the vector index.
    pub fn params(&self) -> VectorSearchParams {
        VectorSearchParams {
            index_name: self.index_name.clone(),
            field: self.field.clone(),
            k: self.k,
            candidate_pool: self.candidate_pool,
        }
    }
}

/// Query batch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum queries accepted per request; the rest are dropped.
    #[serde(default = "default_max_queries")]
    pub max_queries: usize,

    /// Policy applied when query embedding fails.
    #[serde(default)]
    pub on_embedding_failure: EmbeddingFailurePolicy,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_queries: 5,
            on_embedding_failure: EmbeddingFailurePolicy::default(),
        }
    }
}

// Default value functions

fn default_true() -> bool {
    true
}

fn default_rrf_k() -> u32 {
    60
}

fn default_weight() -> f64 {
    1.0
}

fn default_max_chunks() -> usize {
    20
}

fn default_engine_k() -> usize {
    20
}

fn default_candidate_pool() -> usize {
    100
}

fn default_max_queries() -> usize {
    5
}

fn default_lexical_index() -> String {
    "chunkIndex".to_string()
}

fn default_vector_index() -> String {
    "chunkEmbeddingIndex".to_string()
}

fn default_vector_field() -> String {
    "embedding".to_string()
}

fn default_search_paths() -> Vec<String> {
    vec![
        "sentences".to_string(),
        "sectionPath".to_string(),
        "tags".to_string(),
        "title".to_string(),
    ]
}

impl RetrievalConfig {
    /// Load configuration from file.
    pub fn load(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::error::RetrievalError::Config {
                message: format!("Failed to parse config: {}", e),
            })?;
        Ok(config)
    }

    /// Load configuration from default paths.
    pub fn load_default() -> crate::error::Result<Self> {
        // Try user config first
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("grounding").join("config.toml");
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        // Try local config
        let local_config = PathBuf::from("grounding.toml");
        if local_config.exists() {
            return Self::load(&local_config);
        }

        // Return defaults
        Ok(Self::default())
    }
}
