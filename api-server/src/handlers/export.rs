//! Prediction log download

use axum::{extract::State, http::header, response::IntoResponse};

use super::run_blocking;
use crate::{AppResult, AppState};

/// Whole log as a CSV attachment (header only when nothing was logged yet)
pub async fn download(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.store.clone();
    let bytes = run_blocking(move || Ok(store.export_bytes()?)).await?;

    let headers = [
        (header::CONTENT_TYPE, "text/csv".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", state.config.output_file_name()),
        ),
    ];

    Ok((headers, bytes))
}
