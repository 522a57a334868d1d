use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which of the two model artifacts an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Vectorizer,
    Classifier,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Vectorizer => f.write_str("vectorizer"),
            ArtifactKind::Classifier => f.write_str("classifier"),
        }
    }
}

/// Failure to load or use a vectorizer/classifier artifact
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("{kind} artifact {path:?} could not be read: {source}")]
    Io {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} artifact {path:?} is not valid JSON: {source}")]
    Parse {
        kind: ArtifactKind,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} artifact is invalid: {reason}")]
    Invalid { kind: ArtifactKind, reason: String },
}

impl ArtifactError {
    pub fn invalid(kind: ArtifactKind, reason: impl Into<String>) -> Self {
        ArtifactError::Invalid {
            kind,
            reason: reason.into(),
        }
    }

    /// Artifact that failed
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactError::Io { kind, .. }
            | ArtifactError::Parse { kind, .. }
            | ArtifactError::Invalid { kind, .. } => *kind,
        }
    }
}

/// Errors returned by a classify call
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("message is empty")]
    EmptyInput,

    #[error("model artifact unavailable: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Application-level errors (startup, configuration, serving)
#[derive(Error, Debug)]
pub enum SpamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpamError>;
