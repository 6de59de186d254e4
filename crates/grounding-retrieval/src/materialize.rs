//! Shared chunk materialization: cache first, then one batch store fetch.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use grounding_core::{Chunk, ChunkStore};

/// Resolve ranked ids to full chunk documents, preserving ranked order.
///
/// Ids already in `cache` (populated from lexical hits, which carry full
/// documents) are served from it; every remaining id is resolved in a
/// single `find_by_ids` round trip. Ids that still cannot be resolved are
/// logged and dropped, never a hard failure.
pub(crate) async fn materialize_chunks<S>(
    store: &S,
    mut cache: HashMap<String, Chunk>,
    ranked_ids: Vec<String>,
) -> Vec<Chunk>
where
    S: ChunkStore + ?Sized,
{
    if ranked_ids.is_empty() {
        return Vec::new();
    }

    let missing: HashSet<String> = ranked_ids
        .iter()
        .filter(|id| !cache.contains_key(*id))
        .cloned()
        .collect();

    if !missing.is_empty() {
        match store.find_by_ids(&missing).await {
            Ok(chunks) => {
                for chunk in chunks {
                    cache.insert(chunk.chunk_id.clone(), chunk);
                }
            }
            Err(err) => {
                // Return whatever the cache already covers.
                warn!(error = %err, missing = missing.len(), "failed to fetch chunks from store");
            }
        }
    }

    let mut ordered = Vec::with_capacity(ranked_ids.len());
    for id in ranked_ids {
        match cache.remove(&id) {
            Some(chunk) => ordered.push(chunk),
            None => info!(chunk_id = %id, "chunk id missing after lookup"),
        }
    }

    ordered
}
