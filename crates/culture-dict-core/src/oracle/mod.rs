//! Read-only access to a pre-trained word-embedding model.
//!
//! The pipeline never talks to a concrete embedding library. It consumes the
//! [`EmbeddingOracle`] capability: vector lookup plus the vocabulary ordered
//! by descending corpus frequency. [`KeyedVectors`] is the in-memory backend,
//! filled either directly from entries or by the word2vec loaders in
//! [`loader`].
//!
//! # Thread Safety
//!
//! Oracles are immutable after construction and must be `Send + Sync`; the
//! pipeline shares one instance by reference across rayon workers.

pub mod loader;

use std::collections::HashMap;

use crate::error::{ExpansionError, ExpansionResult};

pub use loader::{load_word2vec, ModelFormat};

/// Capability interface over an embedding model.
pub trait EmbeddingOracle: Send + Sync {
    /// Embedding of `word`, if the model has one.
    fn vector_of(&self, word: &str) -> Option<&[f32]>;

    /// Whole vocabulary, most frequent word first.
    fn vocabulary_by_frequency(&self) -> &[String];

    /// Number of words in the vocabulary.
    fn vocabulary_size(&self) -> usize {
        self.vocabulary_by_frequency().len()
    }

    /// Position of `word` in [`vocabulary_by_frequency`](Self::vocabulary_by_frequency).
    /// Lower is more frequent.
    fn frequency_rank(&self, word: &str) -> Option<usize>;

    /// Width of every embedding vector.
    fn dimension(&self) -> usize;

    /// True if the vocabulary contains `word`.
    fn contains(&self, word: &str) -> bool {
        self.frequency_rank(word).is_some()
    }
}

/// Dense in-memory word vectors in frequency order.
///
/// Vectors are stored in one flat buffer; the vector for the word at rank `i`
/// occupies `vectors[i * dim..(i + 1) * dim]`.
#[derive(Debug, Clone)]
pub struct KeyedVectors {
    words: Vec<String>,
    index: HashMap<String, usize>,
    vectors: Vec<f32>,
    dim: usize,
}

impl KeyedVectors {
    /// Build from `(word, vector)` pairs given in descending frequency order.
    ///
    /// # Errors
    /// `OracleUnavailable` when the entries are empty, vectors differ in
    /// width, a word repeats, or a component is NaN/infinite.
    pub fn from_entries<I>(entries: I) -> ExpansionResult<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut words = Vec::new();
        let mut index = HashMap::new();
        let mut vectors = Vec::new();
        let mut dim = None;

        for (word, vector) in entries {
            let expected = *dim.get_or_insert(vector.len());
            if expected == 0 {
                return Err(ExpansionError::oracle_unavailable(
                    "embedding vectors must have at least one component",
                ));
            }
            if vector.len() != expected {
                return Err(ExpansionError::oracle_unavailable(format!(
                    "vector for '{}' has {} components, expected {}",
                    word,
                    vector.len(),
                    expected
                )));
            }
            if let Some(pos) = vector.iter().position(|x| !x.is_finite()) {
                return Err(ExpansionError::oracle_unavailable(format!(
                    "vector for '{}' has non-finite value at index {}",
                    word, pos
                )));
            }
            if index.contains_key(&word) {
                return Err(ExpansionError::oracle_unavailable(format!(
                    "word '{}' appears twice in the vocabulary",
                    word
                )));
            }
            index.insert(word.clone(), words.len());
            words.push(word);
            vectors.extend_from_slice(&vector);
        }

        let dim = dim.ok_or_else(|| ExpansionError::oracle_unavailable("embedding model is empty"))?;

        Ok(Self {
            words,
            index,
            vectors,
            dim,
        })
    }

    /// Vector of the word at frequency rank `rank`.
    #[inline]
    pub fn vector_at(&self, rank: usize) -> Option<&[f32]> {
        if rank >= self.words.len() {
            return None;
        }
        Some(&self.vectors[rank * self.dim..(rank + 1) * self.dim])
    }
}

impl EmbeddingOracle for KeyedVectors {
    fn vector_of(&self, word: &str) -> Option<&[f32]> {
        let rank = *self.index.get(word)?;
        self.vector_at(rank)
    }

    fn vocabulary_by_frequency(&self) -> &[String] {
        &self.words
    }

    fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    fn frequency_rank(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::KeyedVectors;

    /// Build a model from `(word, vector)` literals in frequency order.
    pub fn oracle(entries: &[(&str, &[f32])]) -> KeyedVectors {
        KeyedVectors::from_entries(
            entries
                .iter()
                .map(|(w, v)| (w.to_string(), v.to_vec())),
        )
        .expect("fixture entries are valid")
    }

    /// Two well-separated clusters: fruit along x, vehicles along y.
    pub fn fruit_and_vehicles() -> KeyedVectors {
        oracle(&[
            ("apple", &[1.0, 0.1, 0.0]),
            ("car", &[0.1, 1.0, 0.0]),
            ("banana", &[0.9, 0.2, 0.0]),
            ("truck", &[0.2, 0.9, 0.0]),
            ("cherry", &[0.95, 0.05, 0.1]),
            ("bus", &[0.05, 0.95, 0.1]),
            ("pear", &[0.8, 0.3, 0.1]),
            ("van", &[0.3, 0.8, 0.1]),
            ("grape", &[0.7, 0.1, 0.3]),
            ("bicycle", &[0.2, 0.6, 0.4]),
            ("stone", &[0.0, 0.0, 1.0]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_lookup_and_rank() {
        let kv = fruit_and_vehicles();
        assert_eq!(kv.vocabulary_size(), 11);
        assert_eq!(kv.dimension(), 3);
        assert_eq!(kv.frequency_rank("apple"), Some(0));
        assert_eq!(kv.frequency_rank("stone"), Some(10));
        assert_eq!(kv.vector_of("car"), Some(&[0.1, 1.0, 0.0][..]));
        assert!(kv.vector_of("zeppelin").is_none());
        assert!(kv.contains("bus"));
        assert!(!kv.contains("Bus"));
        assert_eq!(kv.vocabulary_by_frequency()[1], "car");
    }

    #[test]
    fn test_vector_at_bounds() {
        let kv = oracle(&[("a", &[1.0, 2.0]), ("b", &[3.0, 4.0])]);
        assert_eq!(kv.vector_at(1), Some(&[3.0, 4.0][..]));
        assert_eq!(kv.vector_at(2), None);
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let err = KeyedVectors::from_entries(vec![
            ("a".to_string(), vec![1.0, 2.0]),
            ("b".to_string(), vec![1.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, ExpansionError::OracleUnavailable { .. }));
    }

    #[test]
    fn test_rejects_duplicates_and_non_finite() {
        let dup = KeyedVectors::from_entries(vec![
            ("a".to_string(), vec![1.0]),
            ("a".to_string(), vec![2.0]),
        ]);
        assert!(dup.is_err());

        let nan = KeyedVectors::from_entries(vec![("a".to_string(), vec![f32::NAN])]);
        assert!(nan.is_err());
    }

    #[test]
    fn test_rejects_empty_model() {
        let err = KeyedVectors::from_entries(Vec::new()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
