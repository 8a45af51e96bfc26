//! Similarity re-ranker.
//!
//! After deduplication each dimension holds its anchored seed words and the
//! candidates it kept. Every member is scored against the dimension centroid
//! with the same cosine metric the ranker used, then sorted score descending,
//! frequency rank ascending.

use std::collections::HashSet;

use tracing::debug;

use crate::centroid::Centroid;
use crate::dedup::DimensionCandidates;
use crate::oracle::EmbeddingOracle;
use crate::similarity::cosine_with_norm;
use crate::types::{ranking_order, ScoredWord};

/// Build the final ranked word list of one dimension.
///
/// Seeds the oracle does not know are dropped. A known seed whose cosine is
/// undefined (zero vector or degenerate centroid) is kept with score `0.0`
/// so it stays anchored to its dimension.
pub fn rerank<O>(dimension: &DimensionCandidates, centroid: &Centroid, oracle: &O) -> Vec<ScoredWord>
where
    O: EmbeddingOracle + ?Sized,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(centroid.resolved_seeds.len() + dimension.candidates.len());

    for seed in &centroid.resolved_seeds {
        if !seen.insert(seed.as_str()) {
            continue;
        }
        let (Some(rank), Some(vector)) = (oracle.frequency_rank(seed), oracle.vector_of(seed)) else {
            continue;
        };
        let score = cosine_with_norm(&centroid.vector, centroid.norm, vector).unwrap_or(0.0);
        out.push(ScoredWord::new(seed.clone(), score, rank));
    }

    for cand in &dimension.candidates {
        if !seen.insert(cand.word.as_str()) {
            continue;
        }
        let (Some(rank), Some(vector)) = (oracle.frequency_rank(&cand.word), oracle.vector_of(&cand.word))
        else {
            continue;
        };
        if let Some(score) = cosine_with_norm(&centroid.vector, centroid.norm, vector) {
            out.push(ScoredWord::new(cand.word.clone(), score, rank));
        }
    }

    out.sort_by(ranking_order);
    debug!(
        "Dimension '{}': {} word(s) after re-ranking",
        dimension.name,
        out.len()
    );
    out
}
