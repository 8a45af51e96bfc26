//! Root configuration for a dictionary expansion run.
//!
//! # Loading Configuration
//!
//! ```rust,ignore
//! use culture_dict_core::ExpansionConfig;
//!
//! let config = ExpansionConfig::from_file("culture.toml")?.with_env_overrides();
//! config.validate()?;
//! ```
//!
//! # TOML Structure
//!
//! ```toml
//! [expansion]
//! restrict = 5000
//! n_words = 500
//! min_similarity = 0.0
//! centroid_mode = "mean"
//! parallel = true
//! filter_words = ["company"]
//!
//! [model]
//! path = "models/w2v/w2v.txt"
//! format = "auto"
//!
//! [output]
//! path = "outputs/dict/expanded_dict.csv"
//! format = "csv_long"
//! delimiter = ","
//!
//! [[dimensions]]
//! name = "integrity"
//! seeds = ["integrity", "ethic", "accountable"]
//!
//! [[dimensions]]
//! name = "teamwork"
//! seeds = ["collaborate", "cooperate"]
//! n_words = 300
//! ```
//!
//! Invalid values are rejected by `validate()`; nothing silently falls back.

use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::centroid::CentroidMode;
use crate::error::{ExpansionError, ExpansionResult};
use crate::oracle::ModelFormat;
use crate::types::DimensionSpec;
use crate::writer::OutputFormat;

// ============================================================================
// EXPANSION CONFIG
// ============================================================================

/// Search parameters shared by every dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpansionSection {
    /// Restriction size R as an absolute word count.
    #[serde(default)]
    pub restrict: Option<usize>,

    /// Restriction size R as a share of the vocabulary, in `(0.0, 1.0]`.
    /// Mutually exclusive with `restrict`. With neither set the whole
    /// vocabulary is searched.
    #[serde(default)]
    pub restrict_fraction: Option<f64>,

    /// Default expansion count N per dimension.
    #[serde(default = "default_n_words")]
    pub n_words: usize,

    /// Candidates below this similarity are dropped.
    #[serde(default)]
    pub min_similarity: Option<f32>,

    #[serde(default)]
    pub centroid_mode: CentroidMode,

    /// Rank dimensions on the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Words never emitted as candidates.
    #[serde(default)]
    pub filter_words: Vec<String>,
}

fn default_n_words() -> usize {
    50
}

fn default_parallel() -> bool {
    true
}

impl Default for ExpansionSection {
    fn default() -> Self {
        Self {
            restrict: None,
            restrict_fraction: None,
            n_words: default_n_words(),
            min_similarity: None,
            centroid_mode: CentroidMode::default(),
            parallel: default_parallel(),
            filter_words: Vec::new(),
        }
    }
}

impl ExpansionSection {
    pub fn validate(&self) -> ExpansionResult<()> {
        if self.restrict.is_some() && self.restrict_fraction.is_some() {
            return Err(ExpansionError::invalid_config(
                "set either restrict or restrict_fraction, not both",
            ));
        }
        if self.restrict == Some(0) {
            return Err(ExpansionError::invalid_config("restrict must be > 0"));
        }
        if let Some(f) = self.restrict_fraction {
            if f.is_nan() || f <= 0.0 || f > 1.0 {
                return Err(ExpansionError::invalid_config(format!(
                    "restrict_fraction must be in (0.0, 1.0], got {}",
                    f
                )));
            }
        }
        if self.n_words == 0 {
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

    pub fn restriction(&self) -> Restriction {
        match (self.restrict, self.restrict_fraction) {
            (Some(n), _) => Restriction::Count(n),
            (None, Some(f)) => Restriction::Fraction(f),
            (None, None) => Restriction::All,
        }
    }
}

/// How many of the most frequent words are eligible as candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Restriction {
    All,
    Count(usize),
    Fraction(f64),
}

impl Restriction {
    /// Concrete R for a vocabulary of `vocabulary_size` words, never more
    /// than the vocabulary and at least 1 for a fraction.
    pub fn resolve(&self, vocabulary_size: usize) -> usize {
        match *self {
            Restriction::All => vocabulary_size,
            Restriction::Count(n) => n.min(vocabulary_size),
            Restriction::Fraction(f) => {
                let n = (vocabulary_size as f64 * f).ceil() as usize;
                n.clamp(1, vocabulary_size.max(1))
            }
        }
    }
}

// ============================================================================
// MODEL CONFIG
// ============================================================================

/// Where the embedding model lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSection {
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub format: ModelFormat,
}

// ============================================================================
// OUTPUT CONFIG
// ============================================================================

/// Where and how the dictionary is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSection {
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

fn default_delimiter() -> char {
    ','
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            path: None,
            format: OutputFormat::default(),
            delimiter: default_delimiter(),
        }
    }
}

impl OutputSection {
    pub fn validate(&self) -> ExpansionResult<()> {
        if matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(ExpansionError::invalid_config(format!(
                "delimiter {:?} is not allowed",
                self.delimiter
            )));
        }
        Ok(())
    }
}

// ============================================================================
// DIMENSIONS
// ============================================================================

/// One semantic dimension and its seed words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionConfig {
    pub name: String,
    pub seeds: Vec<String>,
    /// Overrides `expansion.n_words` for this dimension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_words: Option<usize>,
}

// ============================================================================
// ROOT CONFIG
// ============================================================================

/// Root configuration. Load from TOML or build in code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionConfig {
    #[serde(default)]
    pub expansion: ExpansionSection,

    #[serde(default)]
    pub model: ModelSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub dimensions: Vec<DimensionConfig>,
}

impl ExpansionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// `InvalidConfiguration` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> ExpansionResult<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExpansionError::invalid_config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&contents).map_err(|e| {
            ExpansionError::invalid_config(format!(
                "Failed to parse TOML in '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(toml: &str) -> ExpansionResult<Self> {
        toml::from_str(toml)
            .map_err(|e| ExpansionError::invalid_config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> ExpansionResult<String> {
        toml::to_string_pretty(self).map_err(|e| ExpansionError::Serialization {
            message: format!("Failed to serialize config: {}", e),
        })
    }

    /// Validate every section, returning the first error found.
    pub fn validate(&self) -> ExpansionResult<()> {
        self.expansion
            .validate()
            .map_err(|e| ExpansionError::invalid_config(format!("[expansion] {}", message_of(&e))))?;

        self.output
            .validate()
            .map_err(|e| ExpansionError::invalid_config(format!("[output] {}", message_of(&e))))?;

        if self.dimensions.is_empty() {
            return Err(ExpansionError::invalid_config(
                "[dimensions] at least one dimension is required",
            ));
        }

        let mut names = HashSet::new();
        let mut seed_home: HashMap<&str, &str> = HashMap::new();
        for spec in self.dimension_specs_unchecked() {
            spec.validate()
                .map_err(|e| ExpansionError::invalid_config(format!("[dimensions] {}", message_of(&e))))?;
            if !names.insert(spec.name.clone()) {
                return Err(ExpansionError::invalid_config(format!(
                    "[dimensions] dimension '{}' is declared twice",
                    spec.name
                )));
            }
        }
        for dim in &self.dimensions {
            for seed in &dim.seeds {
                if let Some(other) = seed_home.insert(seed.as_str(), dim.name.as_str()) {
                    if other != dim.name {
                        return Err(ExpansionError::invalid_config(format!(
                            "[dimensions] seed word '{}' is declared in both '{}' and '{}'",
                            seed, other, dim.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Validated dimension specs in declaration order.
    pub fn dimension_specs(&self) -> ExpansionResult<Vec<DimensionSpec>> {
        self.validate()?;
        Ok(self.dimension_specs_unchecked())
    }

    fn dimension_specs_unchecked(&self) -> Vec<DimensionSpec> {
        self.dimensions
            .iter()
            .map(|d| DimensionSpec {
                name: d.name.clone(),
                seed_words: d.seeds.clone(),
                n_words: d.n_words.unwrap_or(self.expansion.n_words),
            })
            .collect()
    }

    /// Apply environment variable overrides. Prefix: `CULTURE_DICT_`.
    ///
    /// | Variable | Config Path | Type |
    /// |----------|-------------|------|
    /// | `CULTURE_DICT_RESTRICT` | `expansion.restrict` | usize |
    /// | `CULTURE_DICT_N_WORDS` | `expansion.n_words` | usize |
    /// | `CULTURE_DICT_MIN_SIMILARITY` | `expansion.min_similarity` | f32 |
    /// | `CULTURE_DICT_PARALLEL` | `expansion.parallel` | bool |
    /// | `CULTURE_DICT_MODEL_PATH` | `model.path` | path |
    /// | `CULTURE_DICT_OUTPUT_PATH` | `output.path` | path |
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = env::var("CULTURE_DICT_RESTRICT") {
            if let Ok(n) = val.parse::<usize>() {
                self.expansion.restrict = Some(n);
                self.expansion.restrict_fraction = None;
            }
        }
        if let Ok(val) = env::var("CULTURE_DICT_N_WORDS") {
            if let Ok(n) = val.parse::<usize>() {
                self.expansion.n_words = n;
            }
        }
        if let Ok(val) = env::var("CULTURE_DICT_MIN_SIMILARITY") {
            if let Ok(f) = val.parse::<f32>() {
                self.expansion.min_similarity = Some(f);
            }
        }
        if let Ok(val) = env::var("CULTURE_DICT_PARALLEL") {
            if let Ok(b) = val.parse::<bool>() {
                self.expansion.parallel = b;
            }
        }
        if let Ok(val) = env::var("CULTURE_DICT_MODEL_PATH") {
            self.model.path = Some(PathBuf::from(val));
        }
        if let Ok(val) = env::var("CULTURE_DICT_OUTPUT_PATH") {
            self.output.path = Some(PathBuf::from(val));
        }
        self
    }
}

/// Inner message of an `InvalidConfiguration`, so section prefixes do not
/// stack "Invalid configuration:" twice.
fn message_of(e: &ExpansionError) -> String {
    match e {
        ExpansionError::InvalidConfiguration { message } => message.clone(),
        other => other.to_string(),
    }
}
