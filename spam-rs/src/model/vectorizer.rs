//! TF-IDF vectorizer loaded from a fitted scikit-learn export
//!
//! The artifact is a JSON object with the fitted `vocabulary_` and `idf_`
//! plus the parameters that affect `transform`. Omitting `idf` gives plain
//! (optionally binary) term counts, as a `CountVectorizer` would.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

use super::{FeatureTransform, FeatureVector};
use crate::error::{ArtifactError, ArtifactKind};

const KIND: ArtifactKind = ArtifactKind::Vectorizer;

/// Row normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk vectorizer artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    pub vocabulary: HashMap<String, usize>,
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Option<Vec<String>>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    r"(?u)\b\w\w+\b".to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// Validated, ready-to-use vectorizer
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    lowercase: bool,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    binary: bool,
    sublinear_tf: bool,
    norm: Option<Norm>,
}

impl TfidfVectorizer {
    /// Read and validate an artifact file
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            kind: KIND,
            path: path.to_path_buf(),
            source,
        })?;

        let artifact: VectorizerArtifact =
            serde_json::from_str(&content).map_err(|source| ArtifactError::Parse {
                kind: KIND,
                path: path.to_path_buf(),
                source,
            })?;

        Self::from_artifact(artifact)
    }

    /// Parse and validate an artifact from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact: VectorizerArtifact = serde_json::from_str(json)
            .map_err(|e| ArtifactError::invalid(KIND, e.to_string()))?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, ArtifactError> {
        let n_features = artifact.vocabulary.len();
        if n_features == 0 {
            return Err(ArtifactError::invalid(KIND, "vocabulary is empty"));
        }

        let mut seen = vec![false; n_features];
        for (term, &index) in &artifact.vocabulary {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(ArtifactError::invalid(
                        KIND,
                        format!("vocabulary index {} is used twice (term {:?})", index, term),
                    ))
                }
                None => {
                    return Err(ArtifactError::invalid(
                        KIND,
                        format!(
                            "vocabulary index {} for term {:?} is out of range for {} terms",
                            index, term, n_features
                        ),
                    ))
                }
            }
        }

        if let Some(idf) = &artifact.idf {
            if idf.len() != n_features {
                return Err(ArtifactError::invalid(
                    KIND,
                    format!("idf has {} weights for {} terms", idf.len(), n_features),
                ));
            }
            if idf.iter().any(|w| !w.is_finite()) {
                return Err(ArtifactError::invalid(KIND, "idf contains a non-finite weight"));
            }
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::invalid(
                KIND,
                format!("invalid ngram_range ({}, {})", min_n, max_n),
            ));
        }

        let token_pattern = Regex::new(&artifact.token_pattern).map_err(|e| {
            ArtifactError::invalid(KIND, format!("token_pattern does not compile: {}", e))
        })?;
        if token_pattern.captures_len() > 2 {
            return Err(ArtifactError::invalid(
                KIND,
                "token_pattern has more than one capturing group",
            ));
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            token_pattern,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.unwrap_or_default().into_iter().collect(),
            binary: artifact.binary,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
        })
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Index of a term, if it is in the vocabulary
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn has_idf(&self) -> bool {
        self.idf.is_some()
    }

    /// Tokens as the fitted analyzer produces them, before n-gram expansion
    fn tokens(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let grouped = self.token_pattern.captures_len() == 2;
        self.token_pattern
            .captures_iter(&text)
            .filter_map(|caps| {
                let m = if grouped { caps.get(1) } else { caps.get(0) };
                m.map(|m| m.as_str().to_string())
            })
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    fn ngrams(&self, tokens: &[String]) -> Vec<String> {
        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }
}

impl FeatureTransform for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<FeatureVector, ArtifactError> {
        let tokens = self.tokens(text);

        let mut counts: HashMap<usize, f64> = HashMap::new();
        for gram in self.ngrams(&tokens) {
            if let Some(&index) = self.vocabulary.get(&gram) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut weights: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, count)| {
                let mut tf = if self.binary { 1.0 } else { count };
                if self.sublinear_tf {
                    tf = 1.0 + tf.ln();
                }
                let idf = self.idf.as_ref().map_or(1.0, |idf| idf[index]);
                (index, tf * idf)
            })
            .collect();

        let norm = match self.norm {
            Some(Norm::L2) => weights.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
            Some(Norm::L1) => weights.iter().map(|(_, w)| w.abs()).sum::<f64>(),
            None => 1.0,
        };
        if norm > 0.0 {
            for (_, w) in &mut weights {
                *w /= norm;
            }
        }

        debug!(
            tokens = tokens.len(),
            known = weights.len(),
            "Vectorized message"
        );

        Ok(FeatureVector::from_pairs(self.vocabulary.len(), weights))
    }

    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }
}
