//! Vector arithmetic shared by the centroid builder, ranker and re-ranker.
//!
//! Cosine similarity is undefined when either vector has zero magnitude or
//! the dimensions differ; those cases return `None` and the word is skipped
//! instead of being scored with a placeholder value.

/// Dot product of two equally sized slices.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// L2 norm of a vector.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

/// Cosine similarity in `[-1.0, 1.0]`, or `None` when undefined.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    cosine_with_norm(a, l2_norm(a), b)
}

/// Cosine similarity when the norm of `a` is already known.
///
/// Used in the ranking hot loop so the centroid norm is computed once per
/// dimension rather than once per vocabulary word.
#[inline]
pub fn cosine_with_norm(a: &[f32], a_norm: f32, b: &[f32]) -> Option<f32> {
    if a.len() != b.len() {
        return None;
    }
    let b_norm = l2_norm(b);
    if a_norm == 0.0 || b_norm == 0.0 || !a_norm.is_finite() || !b_norm.is_finite() {
        return None;
    }
    let sim = dot(a, b) / (a_norm * b_norm);
    if sim.is_nan() {
        return None;
    }
    // Rounding can push exact parallels a hair past 1.0.
    Some(sim.clamp(-1.0, 1.0))
}

/// Scale a vector to unit length. Zero vectors are returned unchanged.
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let n = l2_norm(v);
    if n > 0.0 {
        v.iter().map(|x| x / n).collect()
    } else {
        v.to_vec()
    }
}
