//! Core data types of the expansion pipeline.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::{ExpansionError, ExpansionResult};

/// A word with its similarity to a dimension and its vocabulary rank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredWord {
    pub word: String,
    /// Cosine similarity in `[-1.0, 1.0]`.
    pub score: f32,
    /// Frequency rank in the embedding vocabulary (0 = most frequent).
    #[serde(skip)]
    pub rank: usize,
}

impl ScoredWord {
    pub fn new(word: impl Into<String>, score: f32, rank: usize) -> Self {
        Self {
            word: word.into(),
            score,
            rank,
        }
    }
}

/// Publication order: score descending, then frequency rank ascending.
///
/// The trailing comparison on the word text only matters if two entries
/// share a rank, which a well-formed vocabulary never produces; it keeps the
/// order total.
pub fn ranking_order(a: &ScoredWord, b: &ScoredWord) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.rank.cmp(&b.rank))
        .then_with(|| a.word.cmp(&b.word))
}

/// Static description of a dimension as declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSpec {
    pub name: String,
    /// Seed words in declaration order, no duplicates.
    pub seed_words: Vec<String>,
    /// Expansion count N for this dimension.
    pub n_words: usize,
}

impl DimensionSpec {
    /// Create a validated dimension.
    ///
    /// # Errors
    /// `InvalidConfiguration` for an empty name, empty or duplicated seed
    /// words, or `n_words == 0`.
    pub fn new(
        name: impl Into<String>,
        seed_words: Vec<String>,
        n_words: usize,
    ) -> ExpansionResult<Self> {
        let spec = Self {
            name: name.into(),
            seed_words,
            n_words,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> ExpansionResult<()> {
        if self.name.trim().is_empty() {
            return Err(ExpansionError::invalid_config("dimension name cannot be empty"));
        }
        if self.seed_words.is_empty() {
            return Err(ExpansionError::invalid_config(format!(
                "dimension '{}' has no seed words",
                self.name
            )));
        }
        let mut seen = HashSet::new();
        for seed in &self.seed_words {
            if seed.trim().is_empty() {
                return Err(ExpansionError::invalid_config(format!(
                    "dimension '{}' has an empty seed word",
                    self.name
                )));
            }
            if !seen.insert(seed.as_str()) {
                return Err(ExpansionError::invalid_config(format!(
                    "dimension '{}' lists seed word '{}' more than once",
                    self.name, seed
                )));
            }
        }
        if self.n_words == 0 {
            return Err(ExpansionError::invalid_config(format!(
                "dimension '{}': n_words must be > 0",
                self.name
            )));
        }
        Ok(())
    }
}

/// Run progress. Each dimension moves through these in order; a dimension
/// whose seeds all miss the vocabulary stops at `Skipped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Unbuilt,
    CentroidsBuilt,
    CandidatesGenerated,
    Deduplicated,
    Ranked,
    Written,
    Skipped,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Unbuilt => "unbuilt",
            PipelineStage::CentroidsBuilt => "centroids_built",
            PipelineStage::CandidatesGenerated => "candidates_generated",
            PipelineStage::Deduplicated => "deduplicated",
            PipelineStage::Ranked => "ranked",
            PipelineStage::Written => "written",
            PipelineStage::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Final ranked word list of one dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictionaryDimension {
    pub name: String,
    pub words: Vec<ScoredWord>,
}

impl DictionaryDimension {
    pub fn contains(&self, word: &str) -> bool {
        self.words.iter().any(|w| w.word == word)
    }

    pub fn word_list(&self) -> Vec<&str> {
        self.words.iter().map(|w| w.word.as_str()).collect()
    }
}

/// A dimension left out of the dictionary, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDimension {
    pub name: String,
    pub reason: String,
}

/// One output row: `(dimension, word, similarity)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DictionaryRow<'a> {
    pub dimension: &'a str,
    pub word: &'a str,
    pub similarity: f32,
}

/// The expanded dictionary, dimensions in declaration order.
///
/// Only [`ExpansionPipeline::run`](crate::pipeline::ExpansionPipeline::run)
/// builds one, so a value of this type is always fully ranked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CultureDictionary {
    dimensions: Vec<DictionaryDimension>,
    skipped: Vec<SkippedDimension>,
}

impl CultureDictionary {
    pub(crate) fn new(dimensions: Vec<DictionaryDimension>, skipped: Vec<SkippedDimension>) -> Self {
        Self {
            dimensions,
            skipped,
        }
    }

    pub fn dimensions(&self) -> &[DictionaryDimension] {
        &self.dimensions
    }

    pub fn skipped(&self) -> &[SkippedDimension] {
        &self.skipped
    }

    pub fn get(&self, name: &str) -> Option<&DictionaryDimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Rows grouped by dimension in declaration order, each group in ranked
    /// order.
    pub fn rows(&self) -> impl Iterator<Item = DictionaryRow<'_>> {
        self.dimensions.iter().flat_map(|d| {
            d.words.iter().map(move |w| DictionaryRow {
                dimension: d.name.as_str(),
                word: w.word.as_str(),
                similarity: w.score,
            })
        })
    }

    /// Total number of words across all dimensions.
    pub fn word_count(&self) -> usize {
        self.dimensions.iter().map(|d| d.words.len()).sum()
    }

    /// True when no dimension produced a word list.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}
