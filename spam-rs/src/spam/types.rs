//! Classification types and the external result contract

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClassifyError;

/// Two-valued classification result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Spam,
    NotSpam,
}

impl Label {
    /// Map a raw predictor class (1 = spam, 0 = not spam)
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            1 => Some(Label::Spam),
            0 => Some(Label::NotSpam),
            _ => None,
        }
    }

    /// Wire name ("spam" / "not_spam")
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Spam => "spam",
            Label::NotSpam => "not_spam",
        }
    }

    pub fn is_spam(&self) -> bool {
        matches!(self, Label::Spam)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Spam => f.write_str("Spam"),
            Label::NotSpam => f.write_str("Not Spam"),
        }
    }
}

/// Error codes exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    EmptyInput,
    ArtifactUnavailable,
}

impl From<&ClassifyError> for ErrorCode {
    fn from(err: &ClassifyError) -> Self {
        match err {
            ClassifyError::EmptyInput => ErrorCode::EmptyInput,
            ClassifyError::Artifact(_) => ErrorCode::ArtifactUnavailable,
        }
    }
}

/// Result of a classify call as seen by API and CLI callers:
/// `{"label": "spam"}` or `{"error": "empty_input"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClassifyOutcome {
    Label { label: Label },
    Error { error: ErrorCode },
}

impl ClassifyOutcome {
    pub fn label(&self) -> Option<Label> {
        match self {
            ClassifyOutcome::Label { label } => Some(*label),
            ClassifyOutcome::Error { .. } => None,
        }
    }
}

impl From<Result<Label, ClassifyError>> for ClassifyOutcome {
    fn from(result: Result<Label, ClassifyError>) -> Self {
        match result {
            Ok(label) => ClassifyOutcome::Label { label },
            Err(err) => ClassifyOutcome::Error {
                error: ErrorCode::from(&err),
            },
        }
    }
}

/// A label together with the normalized text it was predicted from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: Label,
    pub normalized: String,
}
