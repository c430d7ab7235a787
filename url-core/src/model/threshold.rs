//! Decision threshold
//!
//! A probability strictly greater than the threshold is phishing.

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_THRESHOLD;

/// Threshold Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Base threshold (0.0 - 1.0)
    pub base_threshold: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ThresholdConfig {
    /// Clamped into [0, 1]; NaN falls back to the default
    pub fn new(base: f32) -> Self {
        if base.is_nan() {
            return Self::default();
        }
        Self {
            base_threshold: base.clamp(0.0, 1.0),
        }
    }

    pub fn is_phishing(&self, probability: f32) -> bool {
        probability > self.base_threshold
    }
}
