//! HTTP handlers

pub mod export;
pub mod features;
pub mod health;
pub mod predict;


use crate::{AppError, AppResult};

/// Accepted by the prediction routes
pub(crate) fn has_http_scheme(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Run model inference or log file io off the async workers
pub(crate) async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::InternalError(format!("blocking task failed: {}", e)))?
}
