//! Neighbor stitching: document-order reordering plus adjacent-chunk
//! splicing.
//!
//! Rank fusion scores fragments independently of their document position,
//! but a coherent grounding context needs intra-section continuity. The
//! stitcher reorders the ranked list so the best topics come first while
//! each topic's fragments read in natural document order, then splices in
//! the adjacent windows that the ranking missed.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use grounding_core::{Chunk, ChunkStore};

/// Reorders a relevance-ranked chunk list into document order within each
/// topic and splices in adjacent windows fetched from the store.
///
/// Never fails: neighbor augmentation is an enhancement, so any store
/// failure degrades to the reordered input.
pub struct NeighborStitcher<S> {
    store: Arc<S>,
}

impl<S> NeighborStitcher<S>
where
    S: ChunkStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Reorder `ranked` and splice in resolved neighbors.
    ///
    /// Output is at most three times the input length, contains every input
    /// chunk and never emits a duplicate id.
    pub async fn run(&self, ranked: Vec<Chunk>) -> Vec<Chunk> {
        if ranked.is_empty() {
            return ranked;
        }

        let sorted = sort_by_section_rank(ranked);

        let needed = collect_neighbor_ids(&sorted);
        if needed.is_empty() {
            return sorted;
        }

        let neighbors: HashMap<String, Chunk> = match self.store.find_by_ids(&needed).await {
            Ok(chunks) => chunks
                .into_iter()
                .map(|c| (c.chunk_id.clone(), c))
                .collect(),
            Err(err) => {
                warn!(error = %err, "failed to fetch neighbor chunks, returning unaugmented list");
                return sorted;
            }
        };
        debug!(requested = needed.len(), resolved = neighbors.len(), "fetched neighbor chunks");

        splice_neighbors(sorted, neighbors)
    }
}

/// Stable-sort by (first appearance of the chunk's section, window index).
///
/// Converts a flat relevance ranking into "best topics first, each topic in
/// document order".
fn sort_by_section_rank(ranked: Vec<Chunk>) -> Vec<Chunk> {
    let mut section_rank: HashMap<String, usize> = HashMap::new();
    for chunk in &ranked {
        let next = section_rank.len();
        section_rank.entry(chunk.section_id.clone()).or_insert(next);
    }

    let mut sorted = ranked;
    sorted.sort_by_key(|c| (section_rank[&c.section_id], c.window_index));
    sorted
}

/// Neighbor ids worth fetching: non-empty links that are neither already in
/// the list nor already queued.
fn collect_neighbor_ids(sorted: &[Chunk]) -> HashSet<String> {
    let present: HashSet<&str> = sorted.iter().map(|c| c.chunk_id.as_str()).collect();

    let mut needed = HashSet::new();
    for chunk in sorted {
        for link in [&chunk.prev_chunk_id, &chunk.next_chunk_id] {
            if let Some(id) = link {
                if !id.is_empty() && !present.contains(id.as_str()) {
                    needed.insert(id.clone());
                }
            }
        }
    }
    needed
}

/// Walk the sorted list emitting each chunk with its resolved,
/// still-unconsumed neighbors spliced immediately around it.
///
/// Removing a neighbor from the map marks it consumed, so two adjacent
/// ranked chunks sharing a neighbor cannot emit it twice.
fn splice_neighbors(sorted: Vec<Chunk>, mut neighbors: HashMap<String, Chunk>) -> Vec<Chunk> {
    let mut out = Vec::with_capacity(sorted.len() * 3);
    for chunk in sorted {
        if let Some(prev) = chunk
            .prev_chunk_id
            .as_deref()
            .and_then(|id| neighbors.remove(id))
        {
            out.push(prev);
        }

        let next_id = chunk.next_chunk_id.clone();
        out.push(chunk);

        if let Some(next) = next_id.as_deref().and_then(|id| neighbors.remove(id)) {
            out.push(next);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{chunk, init_tracing, linked_chunk, FakeStore};

    fn ids(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.chunk_id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_splices_next_neighbor_after_anchor() {
        init_tracing();
        // A (S1, window 0, next B) ranked first; C (S2, window 2) second.
        // The fetch resolves B (S1, window 1) → A, B, C.
        let stitcher = NeighborStitcher::new(Arc::new(FakeStore::with_chunks(vec![
            linked_chunk("B", "S1", 1, Some("A"), None),
        ])));

        let ranked = vec![
            linked_chunk("A", "S1", 0, None, Some("B")),
            chunk("C", "S2", 2),
        ];
        let out = stitcher.run(ranked).await;
        assert_eq!(ids(&out), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_reorders_sections_by_first_appearance() {
        init_tracing();
        let stitcher = NeighborStitcher::new(Arc::new(FakeStore::default()));

        // S1 ranks first via its window-2 chunk; S1's window 0 ranked later
        // must still precede it in the output block.
        let ranked = vec![
            chunk("s1w2", "S1", 2),
            chunk("s2w0", "S2", 0),
            chunk("s1w0", "S1", 0),
        ];
        let out = stitcher.run(ranked).await;
        assert_eq!(ids(&out), vec!["s1w0", "s1w2", "s2w0"]);
    }

    #[tokio::test]
    async fn test_shared_neighbor_emitted_once() {
        init_tracing();
        // A.next == C.prev == "B"; B must be spliced exactly once.
        let stitcher = NeighborStitcher::new(Arc::new(FakeStore::with_chunks(vec![
            linked_chunk("B", "S1", 1, Some("A"), Some("C")),
        ])));

        let ranked = vec![
            linked_chunk("A", "S1", 0, None, Some("B")),
            linked_chunk("C", "S1", 2, Some("B"), None),
        ];
        let out = stitcher.run(ranked).await;
        assert_eq!(ids(&out), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_dangling_links_are_tolerated() {
        init_tracing();
        let stitcher = NeighborStitcher::new(Arc::new(FakeStore::default()));

        let ranked = vec![linked_chunk("A", "S1", 0, Some("gone"), Some("also-gone"))];
        let out = stitcher.run(ranked).await;
        assert_eq!(ids(&out), vec!["A"]);
    }

    #[tokio::test]
    async fn test_fetch_failure_returns_sorted_list() {
        init_tracing();
        let stitcher = NeighborStitcher::new(Arc::new(FakeStore::failing()));

        let ranked = vec![
            linked_chunk("A", "S1", 1, Some("A0"), None),
            chunk("B", "S2", 0),
        ];
        let out = stitcher.run(ranked).await;
        assert_eq!(ids(&out), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_no_duplicates_and_all_inputs_present() {
        init_tracing();
        let stitcher = NeighborStitcher::new(Arc::new(FakeStore::with_chunks(vec![
            linked_chunk("n1", "S1", 1, Some("a"), None),
            linked_chunk("n2", "S2", 1, Some("b"), None),
        ])));

        let ranked = vec![
            linked_chunk("a", "S1", 0, None, Some("n1")),
            linked_chunk("b", "S2", 0, None, Some("n2")),
            chunk("c", "S3", 0),
        ];
        let input_ids: Vec<String> = ranked.iter().map(|c| c.chunk_id.clone()).collect();

        let out = stitcher.run(ranked).await;
        assert!(out.len() <= 3 * input_ids.len());

        let out_ids = ids(&out);
        let unique: HashSet<&&str> = out_ids.iter().collect();
        assert_eq!(unique.len(), out_ids.len());
        for id in &input_ids {
            assert!(out_ids.contains(&id.as_str()));
        }
    }

    #[tokio::test]
    async fn test_neighbor_already_ranked_not_fetched() {
        init_tracing();
        let store = Arc::new(FakeStore::default());
        let stitcher = NeighborStitcher::new(Arc::clone(&store));

        // B is already in the ranked list, so no fetch is needed at all.
        let ranked = vec![
            linked_chunk("A", "S1", 0, None, Some("B")),
            linked_chunk("B", "S1", 1, Some("A"), None),
        ];
        let out = stitcher.run(ranked).await;
        assert_eq!(ids(&out), vec!["A", "B"]);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_input() {
        init_tracing();
        let stitcher = NeighborStitcher::new(Arc::new(FakeStore::default()));
        assert!(stitcher.run(Vec::new()).await.is_empty());
    }
}
