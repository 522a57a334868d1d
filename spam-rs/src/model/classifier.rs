//! Binary classifiers loaded from fitted scikit-learn exports
//!
//! Supported estimators, selected by the `kind` field:
//! - `multinomial_nb`: `MultinomialNB` (`class_log_prior_`, `feature_log_prob_`)
//! - `bernoulli_nb`: `BernoulliNB`, with its `binarize` threshold
//! - `linear`: any linear decision function (`LogisticRegression`,
//!   `LinearSVC`, `SGDClassifier`) as `coef_[0]` and `intercept_[0]`

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{FeatureVector, Predictor};
use crate::error::{ArtifactError, ArtifactKind};

const KIND: ArtifactKind = ArtifactKind::Classifier;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierModel {
    MultinomialNb {
        classes: Vec<i64>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
    },
    BernoulliNb {
        classes: Vec<i64>,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
        /// Features above the threshold count as present; `null` uses the
        /// raw feature values
        #[serde(default = "default_binarize")]
        binarize: Option<f64>,
    },
    Linear {
        classes: Vec<i64>,
        coef: Vec<f64>,
        intercept: f64,
    },
}

fn default_binarize() -> Option<f64> {
    Some(0.0)
}

impl ClassifierModel {
    /// Read and validate an artifact file
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            kind: KIND,
            path: path.to_path_buf(),
            source,
        })?;

        let model: Self = serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
            kind: KIND,
            path: path.to_path_buf(),
            source,
        })?;

        model.validate()?;
        Ok(model)
    }

    /// Parse and validate an artifact from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let model: Self =
            serde_json::from_str(json).map_err(|e| ArtifactError::invalid(KIND, e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    /// Short estimator name for logs
    pub fn kind_name(&self) -> &'static str {
        match self {
            ClassifierModel::MultinomialNb { .. } => "multinomial_nb",
            ClassifierModel::BernoulliNb { .. } => "bernoulli_nb",
            ClassifierModel::Linear { .. } => "linear",
        }
    }

    pub fn classes(&self) -> &[i64] {
        match self {
            ClassifierModel::MultinomialNb { classes, .. }
            | ClassifierModel::BernoulliNb { classes, .. }
            | ClassifierModel::Linear { classes, .. } => classes,
        }
    }

    /// Structural checks: two classes drawn from {0, 1}, consistent shapes,
    /// finite parameters
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let classes = self.classes();
        if classes.len() != 2 {
            return Err(ArtifactError::invalid(
                KIND,
                format!("expected 2 classes, found {}", classes.len()),
            ));
        }
        if classes[0] == classes[1] || classes.iter().any(|c| *c != 0 && *c != 1) {
            return Err(ArtifactError::invalid(
                KIND,
                format!("classes must be 0 and 1, found {:?}", classes),
            ));
        }

        match self {
            ClassifierModel::MultinomialNb {
                class_log_prior,
                feature_log_prob,
                ..
            } => validate_naive_bayes(class_log_prior, feature_log_prob, false),
            ClassifierModel::BernoulliNb {
                class_log_prior,
                feature_log_prob,
                binarize,
                ..
            } => {
                if binarize.is_some_and(|t| !t.is_finite()) {
                    return Err(ArtifactError::invalid(KIND, "binarize threshold is not finite"));
                }
                validate_naive_bayes(class_log_prior, feature_log_prob, true)
            }
            ClassifierModel::Linear {
                coef, intercept, ..
            } => {
                if coef.is_empty() {
                    return Err(ArtifactError::invalid(KIND, "coef is empty"));
                }
                if !intercept.is_finite() || coef.iter().any(|w| !w.is_finite()) {
                    return Err(ArtifactError::invalid(KIND, "coef or intercept is not finite"));
                }
                Ok(())
            }
        }
    }

    /// Index into `classes` with the highest score
    fn decide(&self, features: &FeatureVector) -> usize {
        match self {
            ClassifierModel::MultinomialNb {
                class_log_prior,
                feature_log_prob,
                ..
            } => {
                let jll: Vec<f64> = class_log_prior
                    .iter()
                    .zip(feature_log_prob)
                    .map(|(prior, row)| prior + features.dot(row))
                    .collect();
                argmax(&jll)
            }
            ClassifierModel::BernoulliNb {
                class_log_prior,
                feature_log_prob,
                binarize,
                ..
            } => {
                // Without a threshold the raw feature values weight each term
                let present: Vec<(usize, f64)> = features
                    .iter()
                    .filter_map(|(i, v)| match binarize {
                        Some(threshold) if v > *threshold => Some((i, 1.0)),
                        Some(_) => None,
                        None => Some((i, v)),
                    })
                    .collect();

                let jll: Vec<f64> = class_log_prior
                    .iter()
                    .zip(feature_log_prob)
                    .map(|(prior, row)| {
                        let absent: f64 = row.iter().map(|lp| log_complement(*lp)).sum();
                        let delta: f64 = present
                            .iter()
                            .map(|&(i, weight)| weight * (row[i] - log_complement(row[i])))
                            .sum();
                        prior + absent + delta
                    })
                    .collect();
                argmax(&jll)
            }
            ClassifierModel::Linear {
                coef, intercept, ..
            } => {
                if features.dot(coef) + intercept > 0.0 {
                    1
                } else {
                    0
                }
            }
        }
    }
}

impl Predictor for ClassifierModel {
    fn predict(&self, features: &FeatureVector) -> Result<i64, ArtifactError> {
        if features.dim() != self.n_features() {
            return Err(ArtifactError::invalid(
                KIND,
                format!(
                    "expected {} features, got {}",
                    self.n_features(),
                    features.dim()
                ),
            ));
        }
        Ok(self.classes()[self.decide(features)])
    }

    fn n_features(&self) -> usize {
        match self {
            ClassifierModel::MultinomialNb {
                feature_log_prob, ..
            }
            | ClassifierModel::BernoulliNb {
                feature_log_prob, ..
            } => feature_log_prob.first().map_or(0, Vec::len),
            ClassifierModel::Linear { coef, .. } => coef.len(),
        }
    }
}

fn validate_naive_bayes(
    class_log_prior: &[f64],
    feature_log_prob: &[Vec<f64>],
    bernoulli: bool,
) -> Result<(), ArtifactError> {
    if class_log_prior.len() != 2 || feature_log_prob.len() != 2 {
        return Err(ArtifactError::invalid(
            KIND,
            format!(
                "expected 2 rows of priors and feature log-probabilities, found {} and {}",
                class_log_prior.len(),
                feature_log_prob.len()
            ),
        ));
    }

    let n_features = feature_log_prob[0].len();
    if n_features == 0 || feature_log_prob[1].len() != n_features {
        return Err(ArtifactError::invalid(
            KIND,
            "feature_log_prob rows are empty or of different lengths",
        ));
    }

    let all = class_log_prior.iter().chain(feature_log_prob.iter().flatten());
    for value in all {
        if value.is_nan() || *value > 0.0 {
            return Err(ArtifactError::invalid(
                KIND,
                format!("{} is not a log-probability", value),
            ));
        }
    }

    if bernoulli && feature_log_prob.iter().flatten().any(|lp| *lp >= 0.0) {
        return Err(ArtifactError::invalid(
            KIND,
            "bernoulli feature probabilities must be below 1",
        ));
    }

    Ok(())
}

/// ln(1 - exp(lp))
fn log_complement(lp: f64) -> f64 {
    (-lp.exp()).ln_1p()
}

/// First index of the maximum
fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if *score > scores[best] {
            best = i;
        }
    }
    best
}
