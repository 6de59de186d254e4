//! In-memory fakes for the collaborator traits, shared by the test modules.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use grounding_core::{
    Chunk, ChunkStore, Embedder, EmbeddingTask, LexicalHit, LexicalIndex, LexicalSearchParams,
    Result, RetrievalError, VectorHit, VectorIndex, VectorSearchParams,
};

/// Install a fmt subscriber so degradation logs show up under
/// `cargo test -- --nocapture`. Safe to call from every test.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

pub(crate) fn chunk(id: &str, section_id: &str, window_index: u32) -> Chunk {
    Chunk {
        chunk_id: id.to_string(),
        section_id: section_id.to_string(),
        window_index,
        section_path: vec!["Heading".to_string()],
        title: "Test Document".to_string(),
        source_uri: format!("file://{}.md", section_id),
        tags: vec![],
        sentences: vec![format!("body of {}", id)],
        prev_chunk_id: None,
        next_chunk_id: None,
    }
}

pub(crate) fn linked_chunk(
    id: &str,
    section_id: &str,
    window_index: u32,
    prev: Option<&str>,
    next: Option<&str>,
) -> Chunk {
    Chunk {
        prev_chunk_id: prev.map(String::from),
        next_chunk_id: next.map(String::from),
        ..chunk(id, section_id, window_index)
    }
}

/// Chunk store fake backed by a map, counting `find_by_ids` round trips.
#[derive(Default)]
pub(crate) struct FakeStore {
    chunks: HashMap<String, Chunk>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeStore {
    pub(crate) fn with_chunks(chunks: Vec<Chunk>) -> Self {
        Self {
            chunks: chunks
                .into_iter()
                .map(|c| (c.chunk_id.clone(), c))
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChunkStore for FakeStore {
    async fn find_by_ids(&self, ids: &HashSet<String>) -> Result<Vec<Chunk>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RetrievalError::store("store unavailable"));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.chunks.get(id).cloned())
            .collect())
    }
}

/// Lexical index fake returning a fixed ranked hit list.
#[derive(Default)]
pub(crate) struct FakeLexical {
    hits: Vec<Chunk>,
    fail: bool,
}

impl FakeLexical {
    pub(crate) fn with_hits(hits: Vec<Chunk>) -> Self {
        Self { hits, fail: false }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl LexicalIndex for FakeLexical {
    async fn search(&self, _query: &str, params: &LexicalSearchParams) -> Result<Vec<LexicalHit>> {
        if self.fail {
            return Err(RetrievalError::lexical_search("index unavailable"));
        }
        Ok(self
            .hits
            .iter()
            .take(params.limit)
            .enumerate()
            .map(|(i, chunk)| LexicalHit {
                chunk: chunk.clone(),
                score: 100.0 - i as f32,
            })
            .collect())
    }
}

/// Vector index fake returning a fixed ranked id list.
#[derive(Default)]
pub(crate) struct FakeVector {
    ids: Vec<String>,
    fail: bool,
}

impl FakeVector {
    pub(crate) fn with_ids(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|id| id.to_string()).collect(),
            fail: false,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl VectorIndex for FakeVector {
    async fn search(
        &self,
        _embedding: &[f32],
        params: &VectorSearchParams,
    ) -> Result<Vec<VectorHit>> {
        if self.fail {
            return Err(RetrievalError::vector_search("index unavailable"));
        }
        Ok(self
            .ids
            .iter()
            .take(params.k)
            .enumerate()
            .map(|(i, id)| VectorHit {
                chunk_id: id.clone(),
                score: 1.0 - i as f32 * 0.01,
            })
            .collect())
    }
}

/// Embedder fake producing a fixed-dimension vector.
#[derive(Default)]
pub(crate) struct FakeEmbedder {
    fail: bool,
}

impl FakeEmbedder {
    pub(crate) fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str, _task: EmbeddingTask) -> Result<Vec<f32>> {
        if self.fail {
            return Err(RetrievalError::embedding("model unavailable"));
        }
        let seed = text.len() as f32;
        Ok(vec![seed; 8])
    }
}
