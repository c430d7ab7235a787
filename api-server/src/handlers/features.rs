//! Feature extraction handlers (diagnostics)

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use phishlens_core::features::LayoutInfo;
use phishlens_core::{process_many, FeatureVector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{AppError, AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct FeaturesRequest {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchFeaturesRequest {
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub url: String,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub features: Map<String, Value>,
}

impl FeaturesResponse {
    fn new(url: String, vector: &FeatureVector) -> Self {
        Self {
            url,
            feature_version: vector.version,
            layout_hash: vector.layout_hash,
            features: vector
                .named()
                .map(|(name, value)| (name.to_string(), Value::from(value)))
                .collect(),
        }
    }
}

/// Current feature schedule
pub async fn layout() -> Json<LayoutInfo> {
    Json(LayoutInfo::current())
}

/// Lexical vector for one URL
pub async fn extract(
    payload: Result<Json<FeaturesRequest>, JsonRejection>,
) -> AppResult<Json<FeaturesResponse>> {
    let url = payload
        .ok()
        .and_then(|Json(req)| req.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::ValidationError("No URL provided".to_string()))?;

    let vector = phishlens_core::extract(&url);
    Ok(Json(FeaturesResponse::new(url, &vector)))
}

/// Network-augmented vectors, in input order
pub async fn extract_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchFeaturesRequest>, JsonRejection>,
) -> AppResult<Json<Vec<FeaturesResponse>>> {
    let urls = payload
        .ok()
        .map(|Json(req)| req.urls)
        .filter(|urls| !urls.is_empty())
        .ok_or_else(|| AppError::ValidationError("No URLs provided".to_string()))?;

    let vectors = process_many(&state.augmenter, &urls, &state.batch).await;

    Ok(Json(
        urls
            .into_iter()
            .zip(&vectors)
            .map(|(url, vector)| FeaturesResponse::new(url, vector))
            .collect(),
    ))
}
