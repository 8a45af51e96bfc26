//! Candidate ranker: top-N vocabulary words closest to a centroid.
//!
//! Only the `restrict` most frequent words are searched. This bounds the cost
//! of a scan and keeps rare, noisily trained embeddings out of the output.
//!
//! # Algorithm
//!
//! ```text
//! for word in vocabulary[..restrict]:
//!     skip excluded words and words without a vector
//!     score = cos(centroid, vector(word))      (skip if undefined)
//!     skip if score < min_similarity
//!     push into a bounded heap of size N keyed on (score desc, rank asc)
//! ```
//!
//! Selection is O(restrict * log N). The result is returned in publication
//! order (see [`ranking_order`]).

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use tracing::debug;

use crate::centroid::Centroid;
use crate::error::{ExpansionError, ExpansionResult};
use crate::oracle::EmbeddingOracle;
use crate::similarity::cosine_with_norm;
use crate::types::{ranking_order, ScoredWord};

/// Search limits for one ranking pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankParams {
    /// Restriction size R: how many of the most frequent words are eligible.
    pub restrict: usize,
    /// Expansion count N: how many candidates to keep.
    pub top_n: usize,
    /// Drop candidates scoring below this value.
    pub min_similarity: Option<f32>,
}

impl RankParams {
    pub fn new(restrict: usize, top_n: usize) -> Self {
        Self {
            restrict,
            top_n,
            min_similarity: None,
        }
    }

    #[must_use]
    pub fn with_min_similarity(mut self, floor: f32) -> Self {
        self.min_similarity = Some(floor);
        self
    }

    pub fn validate(&self) -> ExpansionResult<()> {
        if self.restrict == 0 {
            return Err(ExpansionError::invalid_config("restrict must be > 0"));
        }
        if self.top_n == 0 {
            return Err(ExpansionError::invalid_config("n_words must be > 0"));
        }
        if let Some(floor) = self.min_similarity {
            if floor.is_nan() || !(-1.0..=1.0).contains(&floor) {
                return Err(ExpansionError::invalid_config(format!(
                    "min_similarity must be in [-1.0, 1.0], got {}",
                    floor
                )));
            }
        }
        Ok(())
    }
}

/// Heap entry ordered so that "greater" means "ranks earlier".
#[derive(Debug, Clone, Copy)]
struct Entry {
    score: f32,
    rank: usize,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(other.rank.cmp(&self.rank))
    }
}

/// Rank the restricted vocabulary against `centroid`.
///
/// Returns `min(N, scorable words)` candidates in publication order. Words
/// in `exclude` are never returned.
///
/// # Errors
/// `InvalidConfiguration` when `restrict` or `top_n` is zero, or the
/// similarity floor is out of range.
pub fn rank_candidates<O>(
    centroid: &Centroid,
    oracle: &O,
    params: &RankParams,
    exclude: &HashSet<String>,
) -> ExpansionResult<Vec<ScoredWord>>
where
    O: EmbeddingOracle + ?Sized,
{
    params.validate()?;
    if centroid.is_degenerate() {
        return Ok(Vec::new());
    }

    let vocabulary = oracle.vocabulary_by_frequency();
    let limit = params.restrict.min(vocabulary.len());
    let mut heap: BinaryHeap<Reverse<Entry>> = BinaryHeap::with_capacity(params.top_n + 1);
    let mut scored = 0usize;

    for (rank, word) in vocabulary[..limit].iter().enumerate() {
        if exclude.contains(word) {
            continue;
        }
        let Some(vector) = oracle.vector_of(word) else {
            continue;
        };
        let Some(score) = cosine_with_norm(&centroid.vector, centroid.norm, vector) else {
            continue;
        };
        if params.min_similarity.is_some_and(|floor| score < floor) {
            continue;
        }
        scored += 1;

        let entry = Entry { score, rank };
        if heap.len() < params.top_n {
            heap.push(Reverse(entry));
        } else if heap.peek().is_some_and(|Reverse(worst)| entry > *worst) {
            heap.pop();
            heap.push(Reverse(entry));
        }
    }

    let mut out: Vec<ScoredWord> = heap
        .into_iter()
        .map(|Reverse(e)| ScoredWord::new(vocabulary[e.rank].clone(), e.score, e.rank))
        .collect();
    out.sort_by(ranking_order);

    debug!(
        "Ranked {} of {} restricted words, kept {}",
        scored,
        limit,
        out.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centroid::{build_centroid, CentroidMode};
    use crate::oracle::fixtures::{fruit_and_vehicles, oracle};
    use crate::types::DimensionSpec;

    fn centroid_of(kv: &crate::oracle::KeyedVectors, seeds: &[&str]) -> Centroid {
        let spec = DimensionSpec {
            name: "test".to_string(),
            seed_words: seeds.iter().map(|s| s.to_string()).collect(),
            n_words: 1,
        };
        build_centroid(&spec, kv, CentroidMode::Mean).unwrap()
    }

    fn words(list: &[ScoredWord]) -> Vec<&str> {
        list.iter().map(|w| w.word.as_str()).collect()
    }

    #[test]
    fn test_top_n_sorted_descending() {
        let kv = fruit_and_vehicles();
        let c = centroid_of(&kv, &["apple", "banana"]);
        let out = rank_candidates(&c, &kv, &RankParams::new(100, 4), &HashSet::new()).unwrap();

        assert_eq!(out.len(), 4);
        assert!(out.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(words(&out).contains(&"cherry"));
        assert!(!words(&out).contains(&"truck"));
    }

    #[test]
    fn test_restrict_limits_search_space() {
        let kv = fruit_and_vehicles();
        let c = centroid_of(&kv, &["apple"]);
        // Only apple, car, banana are eligible.
        let out = rank_candidates(&c, &kv, &RankParams::new(3, 10), &HashSet::new()).unwrap();
        assert_eq!(words(&out), vec!["apple", "banana", "car"]);
    }

    #[test]
    fn test_n_larger_than_vocabulary_returns_all_scorable() {
        let kv = oracle(&[
            ("a", &[1.0, 0.0]),
            ("zero", &[0.0, 0.0]),
            ("b", &[0.5, 0.5]),
        ]);
        let c = centroid_of(&kv, &["a"]);
        let out = rank_candidates(&c, &kv, &RankParams::new(1000, 1000), &HashSet::new()).unwrap();
        // The zero vector has no defined cosine and is skipped.
        assert_eq!(words(&out), vec!["a", "b"]);
    }

    #[test]
    fn test_ties_prefer_more_frequent_word() {
        let kv = oracle(&[
            ("seed", &[1.0, 0.0]),
            ("rare_twin", &[0.0, 1.0]),
            ("twin", &[0.0, 1.0]),
            ("late_twin", &[0.0, 2.0]),
        ]);
        let c = centroid_of(&kv, &["seed"]);
        let mut exclude = HashSet::new();
        exclude.insert("seed".to_string());

        let out = rank_candidates(&c, &kv, &RankParams::new(10, 2), &exclude).unwrap();
        assert_eq!(words(&out), vec!["rare_twin", "twin"]);
        assert_eq!(out[0].rank, 1);
        assert_eq!(out[1].rank, 2);
    }

    #[test]
    fn test_exclusions_and_floor() {
        let kv = fruit_and_vehicles();
        let c = centroid_of(&kv, &["apple", "banana"]);
        let exclude: HashSet<String> = ["apple", "banana"].iter().map(|s| s.to_string()).collect();
        let params = RankParams::new(100, 100).with_min_similarity(0.9);

        let out = rank_candidates(&c, &kv, &params, &exclude).unwrap();
        assert!(!words(&out).contains(&"apple"));
        assert!(!words(&out).contains(&"banana"));
        assert!(out.iter().all(|w| w.score >= 0.9));
        assert!(!out.is_empty());
    }

    #[test]
    fn test_invalid_parameters() {
        let kv = fruit_and_vehicles();
        let c = centroid_of(&kv, &["apple"]);
        let none = HashSet::new();

        let err = rank_candidates(&c, &kv, &RankParams::new(0, 5), &none).unwrap_err();
        assert!(matches!(err, ExpansionError::InvalidConfiguration { .. }));
        assert!(rank_candidates(&c, &kv, &RankParams::new(5, 0), &none).is_err());
        let bad_floor = RankParams::new(5, 5).with_min_similarity(1.5);
        assert!(rank_candidates(&c, &kv, &bad_floor, &none).is_err());
    }

    #[test]
    fn test_scores_within_bounds() {
        let kv = fruit_and_vehicles();
        let c = centroid_of(&kv, &["stone", "bus"]);
        let out = rank_candidates(&c, &kv, &RankParams::new(100, 100), &HashSet::new()).unwrap();
        assert_eq!(out.len(), kv.vocabulary_size());
        assert!(out.iter().all(|w| (-1.0..=1.0).contains(&w.score)));
    }
}
