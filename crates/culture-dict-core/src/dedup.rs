//! Deduplicator: every word ends up in at most one dimension.
//!
//! # Policy
//!
//! - A word that is a candidate of several dimensions goes to the dimension
//!   where it scored highest.
//! - Equal scores go to the dimension declared first.
//! - Seed words stay with the dimension that declares them and are removed
//!   as candidates everywhere else, whatever they score there.
//!
//! The input is never mutated; a fresh structure is built so the result does
//! not depend on the order dimensions are visited in.
//!
//! [`ExpansionPipeline`](crate::ExpansionPipeline) already excludes every
//! seed from ranking and rejects seeds shared between dimensions, so there
//! the seed rule never fires. It applies when `deduplicate` is called
//! directly on candidate sets from another source.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::types::ScoredWord;

/// Candidate set of one dimension, as produced by the ranker.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionCandidates {
    pub name: String,
    /// Every seed word declared for the dimension, resolved or not.
    pub seed_words: Vec<String>,
    pub candidates: Vec<ScoredWord>,
}

/// Counters reported after deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Distinct words that were candidates of more than one dimension or
    /// were a seed of another dimension.
    pub contested_words: usize,
    /// Candidate entries dropped across all dimensions.
    pub removed_candidates: usize,
}

/// Result of [`deduplicate`]: same dimensions, same order, disjoint
/// candidate sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated {
    pub dimensions: Vec<DimensionCandidates>,
    pub stats: DedupStats,
}

/// Partition candidate words across dimensions.
pub fn deduplicate(dimensions: &[DimensionCandidates]) -> Deduplicated {
    let mut seed_owner: HashMap<&str, usize> = HashMap::new();
    for (idx, dim) in dimensions.iter().enumerate() {
        for seed in &dim.seed_words {
            seed_owner.entry(seed.as_str()).or_insert(idx);
        }
    }

    // Best (dimension, score) per word; strict `>` keeps the earlier
    // dimension on ties.
    let mut best: HashMap<&str, (usize, f32)> = HashMap::new();
    let mut holders: HashMap<&str, HashSet<usize>> = HashMap::new();
    for (idx, dim) in dimensions.iter().enumerate() {
        for cand in &dim.candidates {
            let word = cand.word.as_str();
            holders.entry(word).or_default().insert(idx);
            match best.entry(word) {
                Entry::Vacant(slot) => {
                    slot.insert((idx, cand.score));
                }
                Entry::Occupied(mut slot) => {
                    if cand.score > slot.get().1 {
                        slot.insert((idx, cand.score));
                    }
                }
            }
        }
    }

    let owner_of = |word: &str| -> Option<usize> {
        seed_owner
            .get(word)
            .copied()
            .or_else(|| best.get(word).map(|(idx, _)| *idx))
    };

    let contested_words = holders
        .iter()
        .filter(|(word, dims)| {
            dims.len() > 1 || seed_owner.get(*word).is_some_and(|owner| !dims.contains(owner))
        })
        .count();

    let mut removed_candidates = 0usize;
    let mut out = Vec::with_capacity(dimensions.len());
    for (idx, dim) in dimensions.iter().enumerate() {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(dim.candidates.len());
        for cand in &dim.candidates {
            if owner_of(cand.word.as_str()) == Some(idx) && seen.insert(cand.word.as_str()) {
                kept.push(cand.clone());
            } else {
                removed_candidates += 1;
            }
        }
        if kept.len() != dim.candidates.len() {
            debug!(
                "Dimension '{}': {} candidate(s) reassigned or dropped",
                dim.name,
                dim.candidates.len() - kept.len()
            );
        }
        out.push(DimensionCandidates {
            name: dim.name.clone(),
            seed_words: dim.seed_words.clone(),
            candidates: kept,
        });
    }

    Deduplicated {
        dimensions: out,
        stats: DedupStats {
            contested_words,
            removed_candidates,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(name: &str, seeds: &[&str], cands: &[(&str, f32)]) -> DimensionCandidates {
        DimensionCandidates {
            name: name.to_string(),
            seed_words: seeds.iter().map(|s| s.to_string()).collect(),
            candidates: cands
                .iter()
                .enumerate()
                .map(|(i, (w, s))| ScoredWord::new(*w, *s, i))
                .collect(),
        }
    }

    fn names(d: &DimensionCandidates) -> Vec<&str> {
        d.candidates.iter().map(|c| c.word.as_str()).collect()
    }

    #[test]
    fn test_word_goes_to_highest_score() {
        let input = vec![
            dim("A", &["apple", "banana"], &[("cherry", 0.9), ("vehicle", 0.81)]),
            dim("B", &["car", "truck"], &[("bus", 0.95), ("vehicle", 0.92)]),
        ];
        let out = deduplicate(&input);

        assert_eq!(names(&out.dimensions[0]), vec!["cherry"]);
        assert_eq!(names(&out.dimensions[1]), vec!["bus", "vehicle"]);
        assert_eq!(out.stats.contested_words, 1);
        assert_eq!(out.stats.removed_candidates, 1);
    }

    #[test]
    fn test_tie_goes_to_first_declared() {
        let input = vec![
            dim("A", &["a"], &[("shared", 0.5)]),
            dim("B", &["b"], &[("shared", 0.5)]),
            dim("C", &["c"], &[("shared", 0.5)]),
        ];
        let out = deduplicate(&input);
        assert_eq!(names(&out.dimensions[0]), vec!["shared"]);
        assert!(out.dimensions[1].candidates.is_empty());
        assert!(out.dimensions[2].candidates.is_empty());
    }

    #[test]
    fn test_seed_word_cannot_be_stolen() {
        // "car" scores higher as a candidate of A than anything, but it is a
        // seed of B.
        let input = vec![
            dim("A", &["apple"], &[("car", 0.99), ("pear", 0.7)]),
            dim("B", &["car"], &[("bus", 0.8)]),
        ];
        let out = deduplicate(&input);
        assert_eq!(names(&out.dimensions[0]), vec!["pear"]);
        assert_eq!(names(&out.dimensions[1]), vec!["bus"]);
        assert_eq!(out.stats.contested_words, 1);
    }

    #[test]
    fn test_input_is_untouched_and_order_kept() {
        let input = vec![
            dim("A", &["a"], &[("x", 0.3), ("y", 0.9)]),
            dim("B", &["b"], &[("x", 0.4)]),
        ];
        let snapshot = input.clone();
        let out = deduplicate(&input);
        assert_eq!(input, snapshot);
        assert_eq!(out.dimensions[0].name, "A");
        assert_eq!(names(&out.dimensions[0]), vec!["y"]);
        assert_eq!(names(&out.dimensions[1]), vec!["x"]);
    }

    #[test]
    fn test_result_is_disjoint() {
        let input = vec![
            dim("A", &["s1"], &[("w1", 0.9), ("w2", 0.2), ("w3", 0.5)]),
            dim("B", &["s2"], &[("w2", 0.8), ("w3", 0.5), ("s1", 0.99)]),
            dim("C", &["s3"], &[("w1", 0.95), ("w4", 0.1)]),
        ];
        let out = deduplicate(&input);
        let mut seen = HashSet::new();
        for d in &out.dimensions {
            for c in &d.candidates {
                assert!(seen.insert(c.word.clone()), "{} assigned twice", c.word);
            }
        }
        assert_eq!(names(&out.dimensions[0]), vec!["w3"]);
        assert_eq!(names(&out.dimensions[1]), vec!["w2"]);
        assert_eq!(names(&out.dimensions[2]), vec!["w1", "w4"]);
    }

    #[test]
    fn test_empty_input() {
        let out = deduplicate(&[]);
        assert!(out.dimensions.is_empty());
        assert_eq!(out.stats, DedupStats::default());
    }
}
