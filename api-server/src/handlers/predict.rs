//! Prediction handlers

use axum::{
    extract::{rejection::JsonRejection, Multipart, State},
    Json,
};
use phishlens_core::model::ClassifyError;
use phishlens_core::{extract, Classifier, Label, PredictionRecord};
use serde::{Deserialize, Serialize};

use super::{has_http_scheme, run_blocking};
use crate::{AppError, AppResult, AppState};

/// Column holding the URLs in an uploaded batch
const URL_COLUMN: &str = "URL";

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: Label,
    pub probability: f32,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub processed: usize,
}

/// Classify one URL and log it
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let url = payload
        .ok()
        .and_then(|Json(req)| req.url)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::ValidationError("No URL provided".to_string()))?;

    if !has_http_scheme(&url) {
        return Err(AppError::ValidationError(
            "Please enter a valid URL starting with http:// or https://".to_string(),
        ));
    }

    let vector = extract(&url);
    tracing::debug!(url = %url, features = %vector.to_log_entry(), "Extracted features");

    let AppState {
        classifier, store, ..
    } = state;
    let prediction = run_blocking(move || {
        let prediction = classifier.classify(&vector)?;
        tracing::debug!(
            url = %url,
            probability = prediction.probability,
            method = prediction.method,
            "Prediction {}",
            prediction.label
        );

        store.append(&[PredictionRecord::from_prediction(url, &prediction)])?;
        Ok(prediction)
    })
    .await?;

    Ok(Json(PredictResponse {
        prediction: prediction.label,
        probability: prediction.probability,
    }))
}

/// Classify every row of an uploaded CSV
///
/// Rows are logged only once the whole file has been classified.
pub async fn predict_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<BatchResponse>> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("Malformed upload: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) =
        upload.ok_or_else(|| AppError::ValidationError("No file provided".to_string()))?;
    if filename.is_empty() {
        return Err(AppError::ValidationError("No file selected".to_string()));
    }

    let urls = read_url_column(&data)?;
    tracing::info!("Batch upload {}: {} rows", filename, urls.len());

    let AppState {
        classifier, store, ..
    } = state;
    let processed = run_blocking(move || {
        let records = urls
            .into_iter()
            .map(|url| classify_row(&classifier, url))
            .collect::<AppResult<Vec<_>>>()?;
        store.append(&records)?;
        Ok(records.len())
    })
    .await?;

    Ok(Json(BatchResponse { processed }))
}

/// Values of the `URL` column, in row order
fn read_url_column(data: &[u8]) -> AppResult<Vec<String>> {
    // Short rows are tolerated and read as an empty URL
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let column = reader
        .headers()
        .map_err(|e| AppError::BatchProcessing(e.to_string()))?
        .iter()
        .position(|h| h == URL_COLUMN)
        .ok_or_else(|| {
            AppError::ValidationError("CSV file must contain 'URL' column".to_string())
        })?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::BatchProcessing(e.to_string()))?;
        urls.push(record.get(column).unwrap_or_default().to_string());
    }
    Ok(urls)
}

/// One log row; a scaler rejection stays local to its row
fn classify_row(classifier: &Classifier, url: String) -> AppResult<PredictionRecord> {
    if !has_http_scheme(&url) {
        return Ok(PredictionRecord::invalid_url(url));
    }

    match classifier.classify(&extract(&url)) {
        Ok(prediction) => Ok(PredictionRecord::from_prediction(url, &prediction)),
        Err(ClassifyError::Scaling(e)) => {
            tracing::warn!("Scaling failed for {}: {}", url, e);
            Ok(PredictionRecord::scaling_error(url))
        }
        Err(ClassifyError::Inference(e)) => Err(AppError::BatchProcessing(e.to_string())),
    }
}
