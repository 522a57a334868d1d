//! spam-rs: Short-message spam classifier
//!
//! Classifies an email or SMS message as spam or not spam with a
//! pre-trained model.
//!
//! # Pipeline
//!
//! - **Normalizer**: lowercase, NLTK-compatible word tokenization,
//!   alphanumeric filter, English stop-words, Porter stemming
//! - **Feature transform**: fitted TF-IDF vectorizer loaded from JSON
//! - **Classifier**: fitted naive Bayes or linear model loaded from JSON
//! - **Prediction service**: validates input and runs the three steps
//!
//! # Example
//!
//! ```no_run
//! use spam_rs::config::Config;
//! use spam_rs::model::ArtifactCache;
//! use spam_rs::spam::PredictionService;
//! use spam_rs::text::Normalizer;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let cache = ArtifactCache::global(&config.artifacts);
//!     let service = PredictionService::from_cache(Normalizer::default(), cache)?;
//!
//!     let label = service.classify("WINNER!! Claim your FREE prize now")?;
//!     println!("{}", label);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling
//! - [`text`]: Text normalization
//! - [`model`]: Vectorizer and classifier artifacts
//! - [`spam`]: Prediction service and result types
//! - [`api`]: HTTP API

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod spam;
pub mod text;

// Re-export commonly used types
pub use config::Config;
pub use error::{ArtifactError, ClassifyError, Result, SpamError};
pub use spam::{ClassifyOutcome, Label, PredictionService};
pub use text::{normalize, Normalizer};
