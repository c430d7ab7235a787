use serde::{Deserialize, Serialize};

use crate::model::{Label, Prediction};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    #[serde(rename = "URL")]
    pub url: String,

    #[serde(rename = "Prediction")]
    pub prediction: Label,

    #[serde(rename = "Probability")]
    pub probability: f32,
}

impl PredictionRecord {
    pub fn from_prediction(url: impl Into<String>, prediction: &Prediction) -> Self {
        Self {
            url: url.into(),
            prediction: prediction.label,
            probability: prediction.probability,
        }
    }

    /// Row for input that was rejected before extraction
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prediction: Label::InvalidUrl,
            probability: 0.0,
        }
    }

    /// Row for a vector the scaler refused
    pub fn scaling_error(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            prediction: Label::ScalingError,
            probability: 0.0,
        }
    }
}
