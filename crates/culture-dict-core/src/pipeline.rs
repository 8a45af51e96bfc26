//! End-to-end dictionary expansion.
//!
//! ```text
//! seed words ──► centroid ──► candidates ──┐   (per dimension, parallel)
//!                                          ▼
//!                                   deduplicate          (global, sequential)
//!                                          ▼
//!                                      re-rank ──► CultureDictionary
//! ```
//!
//! Per-dimension work shares nothing but the read-only oracle, so centroid
//! building and ranking run on the rayon pool. Collecting those results is
//! the barrier before deduplication, which needs every candidate set.
//!
//! A dimension whose seeds all miss the vocabulary is logged and skipped.
//! Configuration errors abort before any dimension is processed.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::centroid::{build_centroid, Centroid, CentroidMode};
use crate::config::{ExpansionConfig, Restriction};
use crate::dedup::{deduplicate, DimensionCandidates};
use crate::error::{ExpansionError, ExpansionResult};
use crate::oracle::EmbeddingOracle;
use crate::ranker::{rank_candidates, RankParams};
use crate::rerank::rerank;
use crate::types::{
    CultureDictionary, DictionaryDimension, DimensionSpec, PipelineStage, SkippedDimension,
};

/// Run-wide expansion settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionSettings {
    pub restriction: Restriction,
    pub min_similarity: Option<f32>,
    pub centroid_mode: CentroidMode,
    pub parallel: bool,
    /// Never emitted as candidates.
    pub filter_words: HashSet<String>,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self {
            restriction: Restriction::All,
            min_similarity: None,
            centroid_mode: CentroidMode::default(),
            parallel: true,
            filter_words: HashSet::new(),
        }
    }
}

impl ExpansionSettings {
    /// Settings with an absolute restriction size.
    pub fn with_restrict(restrict: usize) -> Self {
        Self {
            restriction: Restriction::Count(restrict),
            ..Self::default()
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    pub vocabulary_size: usize,
    /// Resolved restriction size R.
    pub restrict: usize,
    pub dimensions_ranked: usize,
    pub dimensions_skipped: usize,
    pub contested_words: usize,
    pub removed_candidates: usize,
    pub total_words: usize,
}

/// A dimension that made it through centroid building and ranking.
struct Expanded {
    candidates: DimensionCandidates,
    centroid: Centroid,
}

/// Drives a single expansion run over a shared oracle.
pub struct ExpansionPipeline<'a, O: EmbeddingOracle + ?Sized> {
    oracle: &'a O,
    dimensions: Vec<DimensionSpec>,
    settings: ExpansionSettings,
}

impl<'a, O: EmbeddingOracle + ?Sized> ExpansionPipeline<'a, O> {
    pub fn new(oracle: &'a O, dimensions: Vec<DimensionSpec>, settings: ExpansionSettings) -> Self {
        Self {
            oracle,
            dimensions,
            settings,
        }
    }

    /// Build a pipeline from a validated configuration.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the configuration fails validation.
    pub fn from_config(oracle: &'a O, config: &ExpansionConfig) -> ExpansionResult<Self> {
        let dimensions = config.dimension_specs()?;
        let settings = ExpansionSettings {
            restriction: config.expansion.restriction(),
            min_similarity: config.expansion.min_similarity,
            centroid_mode: config.expansion.centroid_mode,
            parallel: config.expansion.parallel,
            filter_words: config.expansion.filter_words.iter().cloned().collect(),
        };
        Ok(Self::new(oracle, dimensions, settings))
    }

    pub fn dimensions(&self) -> &[DimensionSpec] {
        &self.dimensions
    }

    pub fn settings(&self) -> &ExpansionSettings {
        &self.settings
    }

    /// Validate run-global parameters before touching any dimension.
    fn validate(&self) -> ExpansionResult<()> {
        if self.dimensions.is_empty() {
            return Err(ExpansionError::invalid_config("no dimensions to expand"));
        }
        match self.settings.restriction {
            Restriction::Count(0) => {
                return Err(ExpansionError::invalid_config("restrict must be > 0"));
            }
            Restriction::Fraction(f) if f.is_nan() || f <= 0.0 || f > 1.0 => {
                return Err(ExpansionError::invalid_config(format!(
                    "restrict_fraction must be in (0.0, 1.0], got {}",
                    f
                )));
            }
            _ => {}
        }
        let mut names = HashSet::new();
        let mut seed_owner: HashMap<&str, &str> = HashMap::new();
        for dim in &self.dimensions {
            dim.validate()?;
            if !names.insert(dim.name.as_str()) {
                return Err(ExpansionError::invalid_config(format!(
                    "dimension '{}' is declared twice",
                    dim.name
                )));
            }
            // A shared seed would be anchored in both dimensions.
            for seed in &dim.seed_words {
                if let Some(owner) = seed_owner.insert(seed.as_str(), dim.name.as_str()) {
                    return Err(ExpansionError::invalid_config(format!(
                        "seed word '{}' is declared in both '{}' and '{}'",
                        seed, owner, dim.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Run every stage and return the ranked dictionary.
    ///
    /// # Errors
    /// `InvalidConfiguration` for bad run-global parameters. Dimensions
    /// without any known seed word are skipped, not reported as errors.
    pub fn run(&self) -> ExpansionResult<(CultureDictionary, ExpansionReport)> {
        self.validate()?;

        let vocabulary_size = self.oracle.vocabulary_size();
        let restrict = self.settings.restriction.resolve(vocabulary_size);
        if restrict == 0 {
            return Err(ExpansionError::oracle_unavailable("embedding vocabulary is empty"));
        }

        let mut exclude: HashSet<String> = self.settings.filter_words.clone();
        for dim in &self.dimensions {
            exclude.extend(dim.seed_words.iter().cloned());
        }

        info!(
            "Expanding {} dimension(s): vocabulary {}, restrict {}, stage {}",
            self.dimensions.len(),
            vocabulary_size,
            restrict,
            PipelineStage::Unbuilt
        );

        // Centroids + candidates, in parallel when enabled. Indexed collect
        // keeps declaration order.
        let outcomes: Vec<ExpansionResult<Expanded>> = if self.settings.parallel {
            self.dimensions
                .par_iter()
                .map(|dim| self.expand_dimension(dim, restrict, &exclude))
                .collect()
        } else {
            self.dimensions
                .iter()
                .map(|dim| self.expand_dimension(dim, restrict, &exclude))
                .collect()
        };

        let mut expanded = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();
        for (dim, outcome) in self.dimensions.iter().zip(outcomes) {
            match outcome {
                Ok(e) => expanded.push(e),
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping dimension '{}': {}", dim.name, e);
                    skipped.push(SkippedDimension {
                        name: dim.name.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            "Stage {}: {} dimension(s) ready, {} skipped",
            PipelineStage::CandidatesGenerated,
            expanded.len(),
            skipped.len()
        );

        let candidate_sets: Vec<DimensionCandidates> =
            expanded.iter().map(|e| e.candidates.clone()).collect();
        let deduped = deduplicate(&candidate_sets);
        info!(
            "Stage {}: {} contested word(s), {} candidate(s) removed",
            PipelineStage::Deduplicated,
            deduped.stats.contested_words,
            deduped.stats.removed_candidates
        );

        let dimensions: Vec<DictionaryDimension> = deduped
            .dimensions
            .iter()
            .zip(expanded.iter())
            .map(|(cands, e)| DictionaryDimension {
                name: cands.name.clone(),
                words: rerank(cands, &e.centroid, self.oracle),
            })
            .collect();

        let report = ExpansionReport {
            vocabulary_size,
            restrict,
            dimensions_ranked: dimensions.len(),
            dimensions_skipped: skipped.len(),
            contested_words: deduped.stats.contested_words,
            removed_candidates: deduped.stats.removed_candidates,
            total_words: dimensions.iter().map(|d| d.words.len()).sum(),
        };
        info!(
            "Stage {}: {} word(s) across {} dimension(s)",
            PipelineStage::Ranked,
            report.total_words,
            report.dimensions_ranked
        );

        Ok((CultureDictionary::new(dimensions, skipped), report))
    }

    fn expand_dimension(
        &self,
        dim: &DimensionSpec,
        restrict: usize,
        exclude: &HashSet<String>,
    ) -> ExpansionResult<Expanded> {
        let centroid = build_centroid(dim, self.oracle, self.settings.centroid_mode)?;
        let params = RankParams {
            restrict,
            top_n: dim.n_words,
            min_similarity: self.settings.min_similarity,
        };
        let candidates = rank_candidates(&centroid, self.oracle, &params, exclude)?;
        Ok(Expanded {
            candidates: DimensionCandidates {
                name: dim.name.clone(),
                seed_words: dim.seed_words.clone(),
                candidates,
            },
            centroid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::fixtures::{fruit_and_vehicles, oracle};

    fn spec(name: &str, seeds: &[&str], n: usize) -> DimensionSpec {
        DimensionSpec::new(name, seeds.iter().map(|s| s.to_string()).collect(), n).unwrap()
    }

    #[test]
    fn test_basic_run() {
        let kv = fruit_and_vehicles();
        let dims = vec![spec("fruit", &["apple", "banana"], 3), spec("vehicle", &["car", "truck"], 3)];
        let pipeline = ExpansionPipeline::new(&kv, dims, ExpansionSettings::with_restrict(100));
        let (dict, report) = pipeline.run().unwrap();

        let fruit = dict.get("fruit").unwrap();
        let vehicle = dict.get("vehicle").unwrap();
        assert!(fruit.contains("apple") && fruit.contains("banana") && fruit.contains("cherry"));
        assert!(vehicle.contains("car") && vehicle.contains("bus"));
        assert_eq!(report.dimensions_ranked, 2);
        assert_eq!(report.restrict, 11);
        assert_eq!(report.total_words, dict.word_count());
    }

    #[test]
    fn test_skips_dimension_without_known_seeds() {
        let kv = fruit_and_vehicles();
        let dims = vec![
            spec("fruit", &["apple"], 2),
            spec("ghost", &["phantom", "spectre"], 2),
        ];
        let (dict, report) = ExpansionPipeline::new(&kv, dims, ExpansionSettings::default())
            .run()
            .unwrap();
        assert_eq!(dict.dimensions().len(), 1);
        assert_eq!(dict.skipped()[0].name, "ghost");
        assert_eq!(report.dimensions_skipped, 1);
    }

    #[test]
    fn test_zero_restrict_is_fatal() {
        let kv = fruit_and_vehicles();
        let dims = vec![spec("fruit", &["apple"], 2)];
        let err = ExpansionPipeline::new(&kv, dims, ExpansionSettings::with_restrict(0))
            .run()
            .unwrap_err();
        assert!(matches!(err, ExpansionError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_seed_shared_across_dimensions_is_rejected() {
        let kv = fruit_and_vehicles();
        let dims = vec![spec("a", &["apple"], 2), spec("b", &["car", "apple"], 2)];
        let err = ExpansionPipeline::new(&kv, dims, ExpansionSettings::default())
            .run()
            .unwrap_err();
        match err {
            ExpansionError::InvalidConfiguration { message } => {
                assert!(message.contains("'apple'"));
                assert!(message.contains("'a'") && message.contains("'b'"));
            }
            other => panic!("expected InvalidConfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_words_never_emitted() {
        let kv = fruit_and_vehicles();
        let mut settings = ExpansionSettings::default();
        settings.filter_words.insert("cherry".to_string());
        let dims = vec![spec("fruit", &["apple"], 5)];
        let (dict, _) = ExpansionPipeline::new(&kv, dims, settings).run().unwrap();
        assert!(!dict.get("fruit").unwrap().contains("cherry"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let kv = fruit_and_vehicles();
        let dims = vec![
            spec("fruit", &["apple", "banana"], 6),
            spec("vehicle", &["car", "truck"], 6),
            spec("misc", &["stone"], 6),
        ];
        let mut seq = ExpansionSettings::default();
        seq.parallel = false;
        let par = ExpansionSettings::default();

        let (a, _) = ExpansionPipeline::new(&kv, dims.clone(), seq).run().unwrap();
        let (b, _) = ExpansionPipeline::new(&kv, dims, par).run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_config() {
        let kv = oracle(&[("x", &[1.0, 0.0]), ("y", &[0.9, 0.1]), ("z", &[0.0, 1.0])]);
        let config = ExpansionConfig::from_toml_str(
            r#"
[expansion]
restrict_fraction = 0.5
n_words = 4

[[dimensions]]
name = "d"
seeds = ["x"]
"#,
        )
        .unwrap();
        let pipeline = ExpansionPipeline::from_config(&kv, &config).unwrap();
        let (dict, report) = pipeline.run().unwrap();
        assert_eq!(report.restrict, 2);
        assert_eq!(dict.get("d").unwrap().word_list(), vec!["x", "y"]);
    }
}
