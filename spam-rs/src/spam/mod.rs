//! Spam classification
//!
//! The prediction service and the label/outcome types it returns.

pub mod service;
pub mod types;

pub use service::PredictionService;
pub use types::*;
