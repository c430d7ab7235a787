//! PhishLens Core
//!
//! URL feature extraction and scoring for phishing detection.
//!
//! # Pipeline
//!
//! ```text
//!  url ──► lexical::extract ──► FeatureVector (84, f38/f39/f55 = -1)
//!               │
//!               └──► network::extract_all ──► redirects + DNS patched in
//!                                                   │
//!  model::Classifier ◄───────────────────────────────┘
//!     scaler.transform ─► scorer.predict (1, 84, 1) ─► threshold
//!               │
//!               ▼
//!  store::CsvPredictionStore (URL, Prediction, Probability)
//! ```
//!
//! The feature schedule in [`features::layout`] is a contract with the trained
//! model: slot order, defaults and numeric edge cases must not drift.

pub mod batch;
pub mod constants;
pub mod features;
pub mod model;
pub mod network;
pub mod store;

pub use batch::{process_many, BatchConfig};
pub use features::{assemble, extract, FeatureVector, FEATURE_COUNT, FEATURE_LAYOUT};
pub use model::{Classifier, Label, Prediction};
pub use store::{CsvPredictionStore, PredictionLog, PredictionRecord};
