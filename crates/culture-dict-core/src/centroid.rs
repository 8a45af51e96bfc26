//! Centroid builder: one representative vector per dimension.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ExpansionError, ExpansionResult};
use crate::oracle::EmbeddingOracle;
use crate::similarity::{l2_norm, normalized};
use crate::types::DimensionSpec;

/// How seed vectors are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentroidMode {
    /// Element-wise mean of the raw seed vectors.
    #[default]
    Mean,
    /// Element-wise mean of the unit-normalised seed vectors, so long
    /// vectors of very frequent words do not dominate.
    UnitMean,
}

impl CentroidMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CentroidMode::Mean => "mean",
            CentroidMode::UnitMean => "unit_mean",
        }
    }
}

/// Centroid of a dimension plus which seeds contributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Centroid {
    pub vector: Vec<f32>,
    /// L2 norm of `vector`, cached for the ranking loop.
    pub norm: f32,
    /// Seeds found in the oracle, declaration order.
    pub resolved_seeds: Vec<String>,
    /// Seeds the oracle does not know.
    pub unresolved_seeds: Vec<String>,
}

impl Centroid {
    /// True when cosine similarity against this centroid is undefined.
    pub fn is_degenerate(&self) -> bool {
        self.norm == 0.0
    }
}

/// Average the vectors of every seed word the oracle knows.
///
/// # Errors
/// - `InvalidConfiguration` if the dimension has no seed words.
/// - `NoResolvedSeedWords` if none of them are in the vocabulary.
pub fn build_centroid<O>(
    dimension: &DimensionSpec,
    oracle: &O,
    mode: CentroidMode,
) -> ExpansionResult<Centroid>
where
    O: EmbeddingOracle + ?Sized,
{
    if dimension.seed_words.is_empty() {
        return Err(ExpansionError::invalid_config(format!(
            "dimension '{}' has no seed words",
            dimension.name
        )));
    }

    let mut sum = vec![0.0f32; oracle.dimension()];
    let mut resolved_seeds = Vec::new();
    let mut unresolved_seeds = Vec::new();

    for seed in &dimension.seed_words {
        match oracle.vector_of(seed) {
            Some(v) => {
                let contribution = match mode {
                    CentroidMode::Mean => v.to_vec(),
                    CentroidMode::UnitMean => normalized(v),
                };
                for (acc, x) in sum.iter_mut().zip(contribution.iter()) {
                    *acc += x;
                }
                resolved_seeds.push(seed.clone());
            }
            None => unresolved_seeds.push(seed.clone()),
        }
    }

    if resolved_seeds.is_empty() {
        return Err(ExpansionError::NoResolvedSeedWords {
            dimension: dimension.name.clone(),
        });
    }
    if !unresolved_seeds.is_empty() {
        warn!(
            "Dimension '{}': {} seed word(s) not in vocabulary: {:?}",
            dimension.name,
            unresolved_seeds.len(),
            unresolved_seeds
        );
    }

    let n = resolved_seeds.len() as f32;
    for x in &mut sum {
        *x /= n;
    }
    let norm = l2_norm(&sum);
    if norm == 0.0 {
        warn!(
            "Dimension '{}': centroid has zero magnitude, no candidates can be scored",
            dimension.name
        );
    }

    debug!(
        "Dimension '{}': centroid from {} seed(s) ({})",
        dimension.name,
        resolved_seeds.len(),
        mode.as_str()
    );

    Ok(Centroid {
        vector: sum,
        norm,
        resolved_seeds,
        unresolved_seeds,
    })
}
