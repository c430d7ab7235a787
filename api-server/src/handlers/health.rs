//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// `onnx` or `fallback`
    scorer: &'static str,
    threshold: f32,
    logged_predictions: usize,
    dns_cache_entries: usize,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        scorer: state.classifier.method(),
        threshold: state.classifier.threshold().base_threshold,
        logged_predictions: state.store.count(),
        dns_cache_entries: state.augmenter.dns().stats().entries,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
