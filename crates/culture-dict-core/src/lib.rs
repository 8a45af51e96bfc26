//! Seed-word dictionary expansion over pre-trained word embeddings.
//!
//! A handful of hand-picked seed words per semantic dimension is expanded into
//! a larger dictionary by collecting the vocabulary words closest to each
//! dimension's centroid in embedding space. Words claimed by several
//! dimensions are assigned to exactly one, and every dimension's final list is
//! ranked by similarity. The result is a candidate lexicon for human review.
//!
//! # Architecture
//!
//! - **EmbeddingOracle**: read-only vector lookup + frequency-ordered vocabulary
//! - **centroid**: mean seed vector per dimension
//! - **ranker**: top-N restricted-vocabulary neighbours of a centroid
//! - **dedup**: one dimension per word, seeds anchored
//! - **rerank**: final ordering by similarity, then frequency
//! - **ExpansionPipeline**: runs the stages, returns a `CultureDictionary`
//! - **writer**: CSV (long or wide) and JSON tables
//!
//! # Example
//!
//! ```rust
//! use culture_dict_core::{
//!     DimensionSpec, ExpansionPipeline, ExpansionSettings, KeyedVectors,
//! };
//!
//! let oracle = KeyedVectors::from_entries(vec![
//!     ("apple".to_string(), vec![1.0, 0.1]),
//!     ("car".to_string(), vec![0.1, 1.0]),
//!     ("pear".to_string(), vec![0.9, 0.2]),
//!     ("bus".to_string(), vec![0.2, 0.9]),
//! ])?;
//!
//! let dimensions = vec![
//!     DimensionSpec::new("fruit", vec!["apple".to_string()], 1)?,
//!     DimensionSpec::new("vehicle", vec!["car".to_string()], 1)?,
//! ];
//! let pipeline = ExpansionPipeline::new(&oracle, dimensions, ExpansionSettings::with_restrict(4));
//! let (dictionary, _report) = pipeline.run()?;
//!
//! assert_eq!(dictionary.get("fruit").unwrap().word_list(), vec!["apple", "pear"]);
//! assert_eq!(dictionary.get("vehicle").unwrap().word_list(), vec!["car", "bus"]);
//! # Ok::<(), culture_dict_core::ExpansionError>(())
//! ```

pub mod centroid;
pub mod config;
pub mod dedup;
pub mod error;
pub mod oracle;
pub mod pipeline;
pub mod ranker;
pub mod rerank;
pub mod similarity;
pub mod types;
pub mod writer;

pub use centroid::{build_centroid, Centroid, CentroidMode};
pub use config::{
    DimensionConfig, ExpansionConfig, ExpansionSection, ModelSection, OutputSection, Restriction,
};
pub use dedup::{deduplicate, DedupStats, Deduplicated, DimensionCandidates};
pub use error::{ExpansionError, ExpansionResult};
pub use oracle::{load_word2vec, EmbeddingOracle, KeyedVectors, ModelFormat};
pub use pipeline::{ExpansionPipeline, ExpansionReport, ExpansionSettings};
pub use ranker::{rank_candidates, RankParams};
pub use rerank::rerank;
pub use similarity::cosine_similarity;
pub use types::{
    ranking_order, CultureDictionary, DictionaryDimension, DictionaryRow, DimensionSpec,
    PipelineStage, ScoredWord, SkippedDimension,
};
pub use writer::{render, write_dictionary, OutputFormat};
