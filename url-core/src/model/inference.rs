//! Inference Engine - ONNX Runtime Integration
//!
//! The classifier takes a single sample shaped `(1, FEATURE_COUNT, 1)`:
//! one batch row, one channel per feature, one value per channel.

use std::path::Path;

use ndarray::Array3;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use thiserror::Error;

use super::LoadError;
use crate::features::{feature_index, FEATURE_COUNT};

#[derive(Debug, Error)]
#[error("InferenceError: {0}")]
pub struct InferenceError(pub String);

// ============================================================================
// SCORER TRAIT
// ============================================================================

/// Maps a scaled vector to a phishing probability in [0, 1]
pub trait Scorer: Send + Sync {
    fn predict(&self, scaled: &[f32]) -> Result<f32, InferenceError>;

    /// Short name reported alongside predictions
    fn method(&self) -> &'static str;
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

/// Scorer backed by an exported ONNX model
pub struct OnnxScorer {
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxScorer {
    /// Load ONNX model from file
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let model_path = model_path.as_ref();
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(LoadError::Onnx(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| LoadError::Onnx(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| LoadError::Onnx(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| LoadError::Onnx(format!("Failed to load model: {}", e)))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| LoadError::Onnx("No output defined".to_string()))?;

        tracing::info!("ONNX model loaded successfully (output: {})", output_name);

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl Scorer for OnnxScorer {
    fn predict(&self, scaled: &[f32]) -> Result<f32, InferenceError> {
        if scaled.len() != FEATURE_COUNT {
            return Err(InferenceError(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                scaled.len()
            )));
        }

        let input_array = Array3::<f32>::from_shape_vec((1, FEATURE_COUNT, 1), scaled.to_vec())
            .map_err(|e| InferenceError(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError("No output".to_string()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;

        let probability = data
            .first()
            .copied()
            .ok_or_else(|| InferenceError("Empty output".to_string()))?;

        Ok(probability.clamp(0.0, 1.0))
    }

    fn method(&self) -> &'static str {
        "onnx"
    }
}

// ============================================================================
// FALLBACK
// ============================================================================

/// Rule weights over unscaled slots
const HEURISTIC_WEIGHTS: &[(&str, f32)] = &[
    ("f3_has_ip", 0.25),
    ("f6_at", 0.10),
    ("f28_punycode", 0.15),
    ("f34_prefix_suffix", 0.10),
    ("f35_random_domain", 0.05),
    ("f36_shortening_service", 0.10),
    ("f37_suspicious_extension", 0.10),
    ("f52_brand_in_domain", 0.05),
    ("f53_brand_in_subdomain", 0.20),
    ("f54_brand_in_path", 0.10),
    ("f56_suspicious_tld", 0.20),
];

/// Deterministic rule-based scorer used when no model is present
///
/// Expects unscaled input (pair with `IdentityScaler`).
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicScorer;

impl Scorer for HeuristicScorer {
    fn predict(&self, scaled: &[f32]) -> Result<f32, InferenceError> {
        if scaled.len() != FEATURE_COUNT {
            return Err(InferenceError(format!(
                "expected {} features, got {}",
                FEATURE_COUNT,
                scaled.len()
            )));
        }

        let slot = |name: &str| {
            feature_index(name)
                .and_then(|i| scaled.get(i).copied())
                .unwrap_or(0.0)
        };

        let mut score: f32 = HEURISTIC_WEIGHTS
            .iter()
            .filter(|(name, _)| slot(name) > 0.0)
            .map(|(_, weight)| weight)
            .sum();

        // Each phishing hint beyond the first adds a little
        score += (slot("f51_phish_hints") - 1.0).max(0.0) * 0.05;
        if slot("f25_https") > 0.0 {
            score -= 0.05;
        }

        Ok(score.clamp(0.0, 1.0))
    }

    fn method(&self) -> &'static str {
        "fallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::extract;

    fn heuristic(url: &str) -> f32 {
        HeuristicScorer.predict(&extract(url).to_f32()).unwrap()
    }

    #[test]
    fn test_heuristic_is_deterministic_and_bounded() {
        let url = "http://paypal.account-verify.tk/login/secure.exe";
        assert_eq!(heuristic(url), heuristic(url));
        assert!((0.0..=1.0).contains(&heuristic(url)));
    }

    #[test]
    fn test_heuristic_orders_obvious_cases() {
        let benign = heuristic("https://www.wikipedia.org/wiki/Rust");
        let lure = heuristic("http://paypal.account-verify.tk/login?update=1");
        assert!(benign <= 0.5, "benign scored {benign}");
        assert!(lure > 0.5, "lure scored {lure}");
    }

    #[test]
    fn test_wrong_length_is_an_error() {
        assert!(HeuristicScorer.predict(&[0.0; 3]).is_err());
    }

    #[test]
    fn test_missing_model_file() {
        let err = OnnxScorer::load("/nonexistent/model.onnx").err().unwrap();
        assert!(matches!(err, LoadError::Onnx(_)));
    }
}
