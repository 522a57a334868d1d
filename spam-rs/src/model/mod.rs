//! Model artifacts and the adapters around them
//!
//! The core only relies on two seams: a [`FeatureTransform`] turning a
//! normalized string into a [`FeatureVector`], and a [`Predictor`] turning
//! that vector into a raw class value. The bundled implementations read JSON
//! exports of fitted scikit-learn objects.

pub mod artifacts;
pub mod classifier;
pub mod vectorizer;

use std::sync::Arc;

use crate::error::{ArtifactError, ArtifactKind};
use crate::spam::Label;

pub use artifacts::{ArtifactCache, ModelArtifacts};
pub use classifier::ClassifierModel;
pub use vectorizer::{Norm, TfidfVectorizer, VectorizerArtifact};

/// Sparse feature vector with a fixed dimension
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    /// (index, value) pairs, sorted by index, no duplicates, no zeros
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    /// All-zero vector
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: Vec::new(),
        }
    }

    /// Build from (index, value) pairs. Duplicate indices are summed, zero
    /// values and indices outside the dimension are dropped.
    pub fn from_pairs(dim: usize, pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = pairs.into_iter().filter(|(i, _)| *i < dim).collect();
        entries.sort_by_key(|(i, _)| *i);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (index, value) in entries {
            match merged.last_mut() {
                Some((last, total)) if *last == index => *total += value,
                _ => merged.push((index, value)),
            }
        }
        merged.retain(|(_, v)| *v != 0.0);

        Self {
            dim,
            entries: merged,
        }
    }

    pub fn from_dense(values: &[f64]) -> Self {
        Self::from_pairs(values.len(), values.iter().copied().enumerate())
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Dot product with a dense weight row of the same dimension
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(i, v)| weights.get(*i).map(|w| w * v))
            .sum()
    }

    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dim];
        for (i, v) in &self.entries {
            dense[*i] = *v;
        }
        dense
    }
}

/// A fitted text-to-feature transform
pub trait FeatureTransform: Send + Sync {
    /// Transform one document
    fn transform(&self, text: &str) -> Result<FeatureVector, ArtifactError>;

    /// Dimension of the produced vectors
    fn n_features(&self) -> usize;
}

/// A fitted binary predictor
pub trait Predictor: Send + Sync {
    /// Raw class value for one feature vector
    fn predict(&self, features: &FeatureVector) -> Result<i64, ArtifactError>;

    /// Number of features the predictor expects
    fn n_features(&self) -> usize;
}

/// Feature transform adapter: always transforms a one-element batch
#[derive(Clone)]
pub struct FeatureAdapter {
    transform: Arc<dyn FeatureTransform>,
}

impl FeatureAdapter {
    pub fn new(transform: Arc<dyn FeatureTransform>) -> Self {
        Self { transform }
    }

    pub fn to_features(&self, text: &str) -> Result<FeatureVector, ArtifactError> {
        let features = self.transform.transform(text)?;
        if features.dim() != self.transform.n_features() {
            return Err(ArtifactError::invalid(
                ArtifactKind::Vectorizer,
                format!(
                    "produced {} features, declared {}",
                    features.dim(),
                    self.transform.n_features()
                ),
            ));
        }
        Ok(features)
    }

    pub fn n_features(&self) -> usize {
        self.transform.n_features()
    }
}

/// Classifier adapter: maps raw predictor output onto [`Label`]
#[derive(Clone)]
pub struct ClassifierAdapter {
    predictor: Arc<dyn Predictor>,
}

impl ClassifierAdapter {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    pub fn predict_label(&self, features: &FeatureVector) -> Result<Label, ArtifactError> {
        let class = self.predictor.predict(features)?;
        Label::from_class(class).ok_or_else(|| {
            ArtifactError::invalid(
                ArtifactKind::Classifier,
                format!("predicted class {}, expected 0 or 1", class),
            )
        })
    }

    pub fn n_features(&self) -> usize {
        self.predictor.n_features()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPredictor(i64);

    impl Predictor for FixedPredictor {
        fn predict(&self, _features: &FeatureVector) -> Result<i64, ArtifactError> {
            Ok(self.0)
        }

        fn n_features(&self) -> usize {
            3
        }
    }

    struct WrongDimTransform;

    impl FeatureTransform for WrongDimTransform {
        fn transform(&self, _text: &str) -> Result<FeatureVector, ArtifactError> {
            Ok(FeatureVector::zeros(2))
        }

        fn n_features(&self) -> usize {
            3
        }
    }

    #[test]
    fn test_feature_vector_from_pairs() {
        let v = FeatureVector::from_pairs(5, vec![(3, 1.0), (1, 2.0), (3, 0.5), (7, 9.0), (0, 0.0)]);
        assert_eq!(v.dim(), 5);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.get(1), 2.0);
        assert_eq!(v.get(3), 1.5);
        assert_eq!(v.get(0), 0.0);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![(1, 2.0), (3, 1.5)]);
    }

    #[test]
    fn test_feature_vector_dense() {
        let v = FeatureVector::from_dense(&[0.0, 1.0, 0.0, 2.0]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.to_dense(), vec![0.0, 1.0, 0.0, 2.0]);
        assert_eq!(v.dot(&[5.0, 3.0, 7.0, 0.5]), 4.0);
    }

    #[test]
    fn test_classifier_adapter_maps_labels() {
        let v = FeatureVector::zeros(3);
        let spam = ClassifierAdapter::new(Arc::new(FixedPredictor(1)));
        let ham = ClassifierAdapter::new(Arc::new(FixedPredictor(0)));
        assert_eq!(spam.predict_label(&v).unwrap(), Label::Spam);
        assert_eq!(ham.predict_label(&v).unwrap(), Label::NotSpam);
    }

    #[test]
    fn test_classifier_adapter_rejects_non_binary() {
        let adapter = ClassifierAdapter::new(Arc::new(FixedPredictor(4)));
        let err = adapter.predict_label(&FeatureVector::zeros(3)).unwrap_err();
        assert_eq!(err.kind(), ArtifactKind::Classifier);
        assert!(err.to_string().contains("predicted class 4"));
    }

    #[test]
    fn test_feature_adapter_checks_dimension() {
        let adapter = FeatureAdapter::new(Arc::new(WrongDimTransform));
        let err = adapter.to_features("free prize").unwrap_err();
        assert_eq!(err.kind(), ArtifactKind::Vectorizer);
    }
}
