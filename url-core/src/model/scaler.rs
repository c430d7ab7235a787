//! Feature scaling
//!
//! The scaler is fit offline alongside the model and stores the column names
//! it was fit on. Any disagreement with the live schedule (count, order,
//! names, layout version) is a [`ScalingError`], never a silent misalignment.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::LoadError;
use crate::features::{FeatureVector, LayoutMismatchError, FEATURE_COUNT};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalingError {
    #[error("scaler expects {expected} features, vector has {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("feature {index} is '{actual}' but scaler was fit on '{expected}'")]
    FeatureName {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),
}

/// Scaling step between extraction and scoring
pub trait FeatureScaler: Send + Sync {
    fn transform(&self, vector: &FeatureVector) -> Result<Vec<f32>, ScalingError>;
}

/// Pass-through, used with the heuristic scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityScaler;

impl FeatureScaler for IdentityScaler {
    fn transform(&self, vector: &FeatureVector) -> Result<Vec<f32>, ScalingError> {
        vector.validate()?;
        Ok(vector.to_f32())
    }
}

/// Standardisation `(x - mean) / scale` with fitted parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Load parameters exported as `{feature_names, mean, scale}`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scaler: Self = serde_json::from_slice(&bytes)?;

        if scaler.mean.len() != scaler.feature_names.len()
            || scaler.scale.len() != scaler.feature_names.len()
        {
            return Err(LoadError::Invalid(format!(
                "scaler has {} names, {} means, {} scales",
                scaler.feature_names.len(),
                scaler.mean.len(),
                scaler.scale.len()
            )));
        }

        tracing::info!(
            "Scaler loaded from {} ({} features)",
            path.display(),
            scaler.feature_names.len()
        );
        Ok(scaler)
    }
}

impl FeatureScaler for StandardScaler {
    fn transform(&self, vector: &FeatureVector) -> Result<Vec<f32>, ScalingError> {
        vector.validate()?;

        if self.feature_names.len() != FEATURE_COUNT || vector.len() != FEATURE_COUNT {
            return Err(ScalingError::FeatureCount {
                expected: self.feature_names.len(),
                actual: vector.len(),
            });
        }

        for (index, (fitted, live)) in self
            .feature_names
            .iter()
            .zip(vector.feature_names())
            .enumerate()
        {
            if fitted != live {
                return Err(ScalingError::FeatureName {
                    index,
                    expected: fitted.clone(),
                    actual: live.to_string(),
                });
            }
        }

        Ok(vector
            .as_slice()
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(&x, (&mean, &scale))| {
                let scale = if scale == 0.0 { 1.0 } else { scale };
                ((x - mean) / scale) as f32
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{extract, FEATURE_LAYOUT};

    fn fitted() -> StandardScaler {
        StandardScaler {
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            mean: vec![1.0; FEATURE_COUNT],
            scale: vec![2.0; FEATURE_COUNT],
        }
    }

    #[test]
    fn test_standardises_each_slot() {
        let mut scaler = fitted();
        scaler.scale[1] = 0.0;

        let vector = FeatureVector::from_vec(vec![5.0, 3.0]);
        let scaled = scaler.transform(&vector).unwrap();

        assert_eq!(scaled.len(), FEATURE_COUNT);
        assert_eq!(scaled[0], 2.0);
        // Zero scale falls back to 1
        assert_eq!(scaled[1], 2.0);
        // Sentinel slots are scaled like any value
        assert_eq!(scaled[2], -1.0);
    }

    #[test]
    fn test_name_mismatch_is_reported() {
        let mut scaler = fitted();
        scaler.feature_names.swap(0, 1);

        let err = scaler.transform(&extract("http://example.com/")).unwrap_err();
        assert_eq!(
            err,
            ScalingError::FeatureName {
                index: 0,
                expected: "f2_hostname_length".into(),
                actual: "f1_url_length".into(),
            }
        );
    }

    #[test]
    fn test_count_mismatch_is_reported() {
        let mut scaler = fitted();
        scaler.feature_names.pop();

        let err = scaler.transform(&FeatureVector::new()).unwrap_err();
        assert!(matches!(err, ScalingError::FeatureCount { expected: 83, actual: 84 }));
    }

    #[test]
    fn test_foreign_layout_is_rejected() {
        let mut vector = FeatureVector::new();
        vector.layout_hash ^= 0xFFFF;

        assert!(matches!(fitted().transform(&vector), Err(ScalingError::Layout(_))));
        assert!(matches!(IdentityScaler.transform(&vector), Err(ScalingError::Layout(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, serde_json::to_vec(&fitted()).unwrap()).unwrap();

        let loaded = StandardScaler::from_file(&path).unwrap();
        assert_eq!(loaded.feature_names.len(), FEATURE_COUNT);

        std::fs::write(&path, r#"{"feature_names":["a"],"mean":[],"scale":[1.0]}"#).unwrap();
        assert!(matches!(StandardScaler::from_file(&path), Err(LoadError::Invalid(_))));

        assert!(matches!(
            StandardScaler::from_file(dir.path().join("missing.json")),
            Err(LoadError::Io { .. })
        ));
    }
}
