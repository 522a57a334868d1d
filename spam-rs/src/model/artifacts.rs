//! Artifact loading and the process-wide artifact cache

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{error, info};

use super::{ClassifierModel, FeatureTransform, Predictor, TfidfVectorizer};
use crate::config::ArtifactsConfig;
use crate::error::{ArtifactError, ArtifactKind};

/// A loaded, mutually consistent vectorizer/classifier pair, read-only after
/// construction
#[derive(Clone)]
pub struct ModelArtifacts {
    transform: Arc<dyn FeatureTransform>,
    predictor: Arc<dyn Predictor>,
}

impl ModelArtifacts {
    /// Pair a transform with a predictor, checking their feature counts agree
    pub fn new(
        transform: Arc<dyn FeatureTransform>,
        predictor: Arc<dyn Predictor>,
    ) -> Result<Self, ArtifactError> {
        if transform.n_features() != predictor.n_features() {
            return Err(ArtifactError::invalid(
                ArtifactKind::Classifier,
                format!(
                    "expects {} features but the vectorizer produces {}",
                    predictor.n_features(),
                    transform.n_features()
                ),
            ));
        }

        Ok(Self {
            transform,
            predictor,
        })
    }

    /// Load both artifacts from the configured paths
    pub fn load(config: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        Self::load_paths(&config.vectorizer_path, &config.model_path)
    }

    pub fn load_paths(vectorizer_path: &Path, model_path: &Path) -> Result<Self, ArtifactError> {
        let vectorizer = TfidfVectorizer::load(vectorizer_path).inspect_err(|e| {
            error!(path = %vectorizer_path.display(), "Failed to load vectorizer: {}", e);
        })?;
        info!(
            path = %vectorizer_path.display(),
            vocabulary = vectorizer.vocabulary_len(),
            idf = vectorizer.has_idf(),
            "Loaded vectorizer"
        );

        let model = ClassifierModel::load(model_path).inspect_err(|e| {
            error!(path = %model_path.display(), "Failed to load classifier: {}", e);
        })?;
        info!(
            path = %model_path.display(),
            kind = model.kind_name(),
            features = model.n_features(),
            "Loaded classifier"
        );

        Self::new(Arc::new(vectorizer), Arc::new(model))
    }

    pub fn transform(&self) -> Arc<dyn FeatureTransform> {
        Arc::clone(&self.transform)
    }

    pub fn predictor(&self) -> Arc<dyn Predictor> {
        Arc::clone(&self.predictor)
    }

    pub fn n_features(&self) -> usize {
        self.transform.n_features()
    }
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("n_features", &self.n_features())
            .finish_non_exhaustive()
    }
}

/// Lazily loaded artifacts, shared read-only once loaded.
///
/// Concurrent first access loads exactly once. A failed load is not cached,
/// so a later call retries.
#[derive(Debug)]
pub struct ArtifactCache {
    config: ArtifactsConfig,
    artifacts: OnceLock<Arc<ModelArtifacts>>,
    init: Mutex<()>,
    loads: AtomicUsize,
}

impl ArtifactCache {
    pub fn new(config: ArtifactsConfig) -> Self {
        Self {
            config,
            artifacts: OnceLock::new(),
            init: Mutex::new(()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Process-wide cache. The first caller's configuration wins.
    pub fn global(config: &ArtifactsConfig) -> &'static ArtifactCache {
        static GLOBAL: OnceLock<ArtifactCache> = OnceLock::new();
        GLOBAL.get_or_init(|| ArtifactCache::new(config.clone()))
    }

    pub fn get_or_load(&self) -> Result<Arc<ModelArtifacts>, ArtifactError> {
        if let Some(artifacts) = self.artifacts.get() {
            return Ok(Arc::clone(artifacts));
        }

        let _guard = self.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(artifacts) = self.artifacts.get() {
            return Ok(Arc::clone(artifacts));
        }

        self.loads.fetch_add(1, Ordering::SeqCst);
        let artifacts = Arc::new(ModelArtifacts::load(&self.config)?);
        let _ = self.artifacts.set(Arc::clone(&artifacts));
        Ok(artifacts)
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.get().is_some()
    }

    /// Number of load attempts made so far
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &ArtifactsConfig {
        &self.config
    }
}
