//! PhishLens API Server
//!
//! HTTP front end for the URL phishing classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     PHISHLENS API                        │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────┐  │
//! │  │  Router   │──►│  Extractor   │──►│  Classifier     │  │
//! │  │  (Axum)   │   │  (lexical /  │   │  (scaler, ONNX) │  │
//! │  │           │   │   network)   │   │                 │  │
//! │  └───────────┘   └──────────────┘   └────────┬────────┘  │
//! │                                              ▼           │
//! │                                     ┌─────────────────┐  │
//! │                                     │  results.csv    │  │
//! │                                     └─────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use phishlens_core::network::NetworkAugmenter;
use phishlens_core::{BatchConfig, Classifier, CsvPredictionStore, PredictionLog};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeFile,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use config::Config;
pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    tracing::info!("PhishLens server starting ({})", config.environment);

    let classifier = Classifier::from_paths(
        &config.model_path,
        &config.scaler_path,
        config.threshold(),
    )
    .context("Failed to load classifier")?;
    tracing::info!(
        "Classifier ready (method: {}, threshold: {})",
        classifier.method(),
        classifier.threshold().base_threshold
    );

    let store = CsvPredictionStore::open(&config.output_csv)
        .with_context(|| format!("Failed to open {}", config.output_csv.display()))?;

    let augmenter = NetworkAugmenter::with_config(config.probe_config(), config.dns_cache_capacity)
        .context("Failed to build HTTP client")?;

    let state = AppState {
        classifier,
        store: Arc::new(store),
        augmenter,
        batch: config.batch_config(),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `LOG_FORMAT=json` switches to structured output
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "phishlens_server=debug,phishlens_core=info,tower_http=debug".into()
    });
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub classifier: Classifier,
    pub store: Arc<dyn PredictionLog>,
    pub augmenter: NetworkAugmenter,
    pub batch: BatchConfig,
    pub config: Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    let prediction_routes = Router::new()
        .route("/predict", post(handlers::predict::predict))
        .route("/predict_batch", post(handlers::predict::predict_batch))
        .route("/download_output", get(handlers::export::download));

    let feature_routes = Router::new()
        .route("/api/v1/layout", get(handlers::features::layout))
        .route("/api/v1/features", post(handlers::features::extract))
        .route("/api/v1/features/batch", post(handlers::features::extract_batch));

    Router::new()
        .route_service("/", ServeFile::new(state.config.index_html()))
        .route("/health", get(handlers::health::check))
        .merge(prediction_routes)
        .merge(feature_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
