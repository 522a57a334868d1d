//! Prediction service
//!
//! Composes the normalizer, the feature adapter and the classifier adapter
//! into a single `classify` operation.

use std::sync::Arc;
use tracing::debug;

use super::types::{Classification, ClassifyOutcome, Label};
use crate::error::{ArtifactError, ClassifyError};
use crate::model::{
    ArtifactCache, ClassifierAdapter, FeatureAdapter, FeatureTransform, ModelArtifacts, Predictor,
};
use crate::text::Normalizer;

/// Stateless spam classifier over loaded artifacts
pub struct PredictionService {
    normalizer: Normalizer,
    features: FeatureAdapter,
    classifier: ClassifierAdapter,
}

impl PredictionService {
    pub fn new(
        normalizer: Normalizer,
        transform: Arc<dyn FeatureTransform>,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        Self {
            normalizer,
            features: FeatureAdapter::new(transform),
            classifier: ClassifierAdapter::new(predictor),
        }
    }

    pub fn from_artifacts(normalizer: Normalizer, artifacts: &ModelArtifacts) -> Self {
        Self::new(normalizer, artifacts.transform(), artifacts.predictor())
    }

    /// Build from a cache, loading the artifacts if needed
    pub fn from_cache(normalizer: Normalizer, cache: &ArtifactCache) -> Result<Self, ArtifactError> {
        let artifacts = cache.get_or_load()?;
        Ok(Self::from_artifacts(normalizer, &artifacts))
    }

    /// Classify a raw message. Empty or whitespace-only input is rejected
    /// without running the pipeline.
    pub fn classify(&self, raw: &str) -> Result<Label, ClassifyError> {
        self.classify_detailed(raw).map(|c| c.label)
    }

    /// Classify and also return the normalized text the label was predicted from
    pub fn classify_detailed(&self, raw: &str) -> Result<Classification, ClassifyError> {
        if is_blank(raw) {
            debug!("Rejected empty message");
            return Err(ClassifyError::EmptyInput);
        }

        let normalized = self.normalizer.normalize(raw);
        let features = self.features.to_features(&normalized)?;
        let label = self.classifier.predict_label(&features)?;

        debug!(
            chars = raw.chars().count(),
            normalized = %normalized,
            features = features.nnz(),
            label = label.as_str(),
            "Classified message"
        );

        Ok(Classification { label, normalized })
    }

    /// Classify into the caller-facing `{label}` / `{error}` shape
    pub fn outcome(&self, raw: &str) -> ClassifyOutcome {
        ClassifyOutcome::from(self.classify(raw))
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("normalizer", &self.normalizer)
            .field("n_features", &self.features.n_features())
            .finish()
    }
}

/// Whitespace also covers the ASCII separators `\x1c`..`\x1f`
fn is_blank(raw: &str) -> bool {
    raw.chars().all(|c| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}
