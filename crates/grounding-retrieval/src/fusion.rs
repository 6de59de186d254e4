//! Reciprocal Rank Fusion and bounded top-K selection.
//!
//! Fusion works on rank positions rather than raw relevance scores: raw
//! scores from heterogeneous engines live on incomparable scales and drift
//! across index versions, while rank position is stable and
//! self-normalizing. The damping constant `k` suppresses the influence of
//! low-ranked hits.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use grounding_core::FusionConfig;

/// Compute fused scores for the union of ids seen by either engine.
///
/// `score(id) = Σ_engine weight_e / (k + rank_e(id))`, summed over the
/// engines in which the id appears. Ranks are 1-based.
pub fn fuse(
    config: &FusionConfig,
    lexical_ranks: &HashMap<String, usize>,
    vector_ranks: &HashMap<String, usize>,
) -> HashMap<String, f64> {
    let k = f64::from(config.rrf_k);
    let mut scores: HashMap<String, f64> =
        HashMap::with_capacity(lexical_ranks.len() + vector_ranks.len());

    for (id, rank) in lexical_ranks {
        *scores.entry(id.clone()).or_insert(0.0) += config.lexical_weight / (k + *rank as f64);
    }
    for (id, rank) in vector_ranks {
        *scores.entry(id.clone()).or_insert(0.0) += config.vector_weight / (k + *rank as f64);
    }

    scores
}

/// A scored candidate; ordered by fused score, with ties broken toward the
/// lexicographically smaller chunk id so selection is deterministic.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    score: f64,
    chunk_id: String,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.chunk_id.cmp(&self.chunk_id))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Select the `max` best-scored ids, best first.
///
/// Maintains a min-heap bounded at `max` entries: once full, an incoming
/// candidate replaces the current weakest only if it beats it. O(n log max)
/// instead of sorting the full candidate set.
pub fn select_top_k(scores: HashMap<String, f64>, max: usize) -> Vec<(String, f64)> {
    if max == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<Candidate>> = BinaryHeap::with_capacity(max);
    for (chunk_id, score) in scores {
        let candidate = Candidate { score, chunk_id };
        if heap.len() < max {
            heap.push(Reverse(candidate));
        } else if let Some(mut weakest) = heap.peek_mut() {
            if candidate > weakest.0 {
                *weakest = Reverse(candidate);
            }
        }
    }

    let mut selected: Vec<Candidate> = heap.into_iter().map(|Reverse(c)| c).collect();
    selected.sort_by(|a, b| b.cmp(a));
    selected
        .into_iter()
        .map(|c| (c.chunk_id, c.score))
        .collect()
}
