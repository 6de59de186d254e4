//! grounding-retrieval - Hybrid-retrieval fusion engine
//!
//! Retrieves and ranks the chunks relevant to a batch of natural-language
//! queries, for use as grounding context by a downstream answer-generation
//! step. For each query, independent lexical and vector searches run
//! concurrently and their rankings are fused with Reciprocal Rank Fusion;
//! a bounded top-K survives per query, the batch is deduplicated, and
//! document-adjacent neighbor chunks are stitched in so the final context
//! reads in natural document order rather than pure relevance order.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grounding_retrieval::SearchPipeline;
//! use grounding_core::RetrievalConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! let pipeline = SearchPipeline::new(store, lexical, vector, embedder, RetrievalConfig::default());
//! let chunks = pipeline.run(&queries, &CancellationToken::new()).await?;
//! let context = grounding_retrieval::render_grounding(&chunks);
//! ```

mod batch;
mod fusion;
mod materialize;
mod render;
mod stitch;
mod unit;

#[cfg(test)]
mod testutil;

pub use batch::SearchPipeline;
pub use fusion::{fuse, select_top_k};
pub use render::render_grounding;
pub use stitch::NeighborStitcher;
pub use unit::HybridSearchUnit;

// Re-export for convenience
pub use grounding_core::{Chunk, Result, RetrievalConfig, RetrievalError};
