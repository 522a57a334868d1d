//! API request handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::error::ClassifyError;
use crate::spam::{ClassifyOutcome, ErrorCode, Label, PredictionService};
use crate::text::NormalizationTrace;

/// Shared application state
pub struct AppState {
    pub service: Arc<PredictionService>,
}

/// Classify request body
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub message: String,
    /// Also return the normalized text
    #[serde(default)]
    pub explain: bool,
}

/// Classify response with the normalized text
#[derive(Debug, Serialize)]
pub struct ExplainedLabel {
    pub label: Label,
    pub normalized: String,
}

/// Normalize request body
#[derive(Debug, Deserialize)]
pub struct NormalizeRequest {
    pub message: String,
}

/// POST /api/classify
pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> impl IntoResponse {
    match state.service.classify_detailed(&req.message) {
        Ok(classification) if req.explain => (
            StatusCode::OK,
            Json(ExplainedLabel {
                label: classification.label,
                normalized: classification.normalized,
            }),
        )
            .into_response(),
        Ok(classification) => (
            StatusCode::OK,
            Json(ClassifyOutcome::Label {
                label: classification.label,
            }),
        )
            .into_response(),
        Err(err) => {
            let status = match &err {
                ClassifyError::EmptyInput => {
                    warn!("Rejected classify request with empty message");
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ClassifyError::Artifact(e) => {
                    error!("Classification failed: {}", e);
                    StatusCode::SERVICE_UNAVAILABLE
                }
            };
            (
                status,
                Json(ClassifyOutcome::Error {
                    error: ErrorCode::from(&err),
                }),
            )
                .into_response()
        }
    }
}

/// POST /api/normalize
pub async fn normalize(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NormalizeRequest>,
) -> Json<NormalizationTrace> {
    Json(state.service.normalizer().explain(&req.message))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "service": "spam-rs",
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
