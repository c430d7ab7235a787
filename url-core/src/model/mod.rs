//! Classification: scaling, scoring and the decision threshold

pub mod inference;
pub mod scaler;
pub mod threshold;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use inference::{HeuristicScorer, InferenceError, OnnxScorer, Scorer};
pub use scaler::{FeatureScaler, IdentityScaler, ScalingError, StandardScaler};
pub use threshold::ThresholdConfig;

use crate::features::FeatureVector;

/// Failure to load model artefacts
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed artefact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid artefact: {0}")]
    Invalid(String),

    #[error("onnx: {0}")]
    Onnx(String),
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Scaling(#[from] ScalingError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Outcome label, as written to the prediction log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "phishing")]
    Phishing,
    #[serde(rename = "benign")]
    Benign,
    #[serde(rename = "invalid URL")]
    InvalidUrl,
    #[serde(rename = "scaling error")]
    ScalingError,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phishing => "phishing",
            Label::Benign => "benign",
            Label::InvalidUrl => "invalid URL",
            Label::ScalingError => "scaling error",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Label,
    pub probability: f32,
    pub method: &'static str,
}

/// Scaler + scorer + threshold
#[derive(Clone)]
pub struct Classifier {
    scaler: Arc<dyn FeatureScaler>,
    scorer: Arc<dyn Scorer>,
    threshold: ThresholdConfig,
}

impl Classifier {
    pub fn new(
        scaler: Arc<dyn FeatureScaler>,
        scorer: Arc<dyn Scorer>,
        threshold: ThresholdConfig,
    ) -> Self {
        Self {
            scaler,
            scorer,
            threshold,
        }
    }

    /// Rule-based classifier with unscaled input
    pub fn heuristic(threshold: ThresholdConfig) -> Self {
        Self::new(Arc::new(IdentityScaler), Arc::new(HeuristicScorer), threshold)
    }

    /// Load the ONNX model and its scaler
    ///
    /// A missing model file falls back to [`Classifier::heuristic`]. When the
    /// model exists, its scaler is required.
    pub fn from_paths(
        model_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
        threshold: ThresholdConfig,
    ) -> Result<Self, LoadError> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            tracing::warn!(
                "Model not found at {}, using heuristic scorer",
                model_path.display()
            );
            return Ok(Self::heuristic(threshold));
        }

        let scaler = StandardScaler::from_file(scaler_path)?;
        let scorer = OnnxScorer::load(model_path)?;
        Ok(Self::new(Arc::new(scaler), Arc::new(scorer), threshold))
    }

    pub fn threshold(&self) -> ThresholdConfig {
        self.threshold
    }

    pub fn method(&self) -> &'static str {
        self.scorer.method()
    }

    /// Scale, score and threshold one vector
    pub fn classify(&self, vector: &FeatureVector) -> Result<Prediction, ClassifyError> {
        let scaled = self.scaler.transform(vector)?;
        let probability = self.scorer.predict(&scaled)?;

        let label = if self.threshold.is_phishing(probability) {
            Label::Phishing
        } else {
            Label::Benign
        };

        Ok(Prediction {
            label,
            probability,
            method: self.scorer.method(),
        })
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier")
            .field("method", &self.scorer.method())
            .field("threshold", &self.threshold)
            .finish()
    }
}
