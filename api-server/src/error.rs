//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use phishlens_core::model::ClassifyError;
use phishlens_core::store::StoreError;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Validation errors
    ValidationError(String),

    // Scaler rejected the feature vector
    ScalingMismatch(String),

    // Batch upload could not be processed
    BatchProcessing(String),

    // Prediction log errors
    StoreError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ScalingMismatch(msg) => {
                tracing::error!("Error scaling features: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Feature scaling mismatch with model expectations",
                )
            }
            AppError::BatchProcessing(msg) => {
                tracing::error!("Error during batch processing: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Error processing CSV file")
            }
            AppError::StoreError(msg) => {
                tracing::error!("Prediction log error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to persist predictions")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ClassifyError> for AppError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::Scaling(e) => AppError::ScalingMismatch(e.to_string()),
            ClassifyError::Inference(e) => AppError::InternalError(e.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StoreError(err.to_string())
    }
}
