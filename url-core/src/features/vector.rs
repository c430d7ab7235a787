//! Feature Vector - Core data structure for model input
//!
//! **Versioned feature vector with layout validation**
//!
//! Every vector handed to a scorer is built through [`assemble`], which
//! re-keys a partial name → value mapping into the canonical schedule and
//! backfills missing slots with the sentinel.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use serde::Serialize;

use super::layout::{
    feature_index, layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT,
    FEATURE_LAYOUT, FEATURE_VERSION,
};
use crate::constants::SENTINEL;

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
///
/// `values` always holds exactly [`FEATURE_COUNT`] entries in
/// [`FEATURE_LAYOUT`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create a vector with every slot at the sentinel
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: vec![SENTINEL; FEATURE_COUNT],
        }
    }

    /// Create from raw values (truncates, or pads with the sentinel)
    pub fn from_vec(values: Vec<f64>) -> Self {
        let mut vector = Self::new();
        for (i, v) in values.into_iter().take(FEATURE_COUNT).enumerate() {
            vector.values[i] = v;
        }
        vector
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Values narrowed to `f32` for tensor input
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }

    /// Set feature by index
    pub fn set(&mut self, index: usize, value: f64) {
        if index < FEATURE_COUNT {
            self.values[index] = value;
        }
    }

    /// Set feature by name
    pub fn set_by_name(&mut self, name: &str, value: f64) -> bool {
        if let Some(index) = feature_index(name) {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// Number of slots (always [`FEATURE_COUNT`])
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get feature names for this vector
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// `(name, value)` pairs in schedule order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter().copied())
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "values": self.values,
        })
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self::from_vec(values)
    }
}

// ============================================================================
// ASSEMBLER
// ============================================================================

/// Re-key a partial feature mapping into the canonical schedule
///
/// Missing names become the sentinel, unknown names are ignored.
pub fn assemble<K, S>(raw: &HashMap<K, f64, S>) -> FeatureVector
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    let values = FEATURE_LAYOUT
        .iter()
        .map(|&name| raw.get(name).copied().unwrap_or(SENTINEL))
        .collect();

    FeatureVector {
        version: FEATURE_VERSION,
        layout_hash: layout_hash(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_new_is_all_sentinel() {
        let vector = FeatureVector::new();
        assert_eq!(vector.version, FEATURE_VERSION);
        assert_eq!(vector.layout_hash, layout_hash());
        assert_eq!(vector.len(), FEATURE_COUNT);
        assert!(vector.as_slice().iter().all(|&v| v == SENTINEL));
    }

    #[test]
    fn test_set_by_name() {
        let mut vector = FeatureVector::new();
        assert!(vector.set_by_name("f25_https", 1.0));
        assert_eq!(vector.get_by_name("f25_https"), Some(1.0));
        assert_eq!(vector.get(24), Some(1.0));

        assert!(!vector.set_by_name("nonexistent", 0.0));
    }

    #[test]
    fn test_from_vec_pads_and_truncates() {
        let short = FeatureVector::from_vec(vec![3.0, 4.0]);
        assert_eq!(short.len(), FEATURE_COUNT);
        assert_eq!(short.get(1), Some(4.0));
        assert_eq!(short.get(2), Some(SENTINEL));

        let long = FeatureVector::from_vec(vec![0.0; FEATURE_COUNT + 10]);
        assert_eq!(long.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_assemble_orders_and_backfills() {
        let mut raw: HashMap<&str, f64> = HashMap::new();
        raw.insert("f84_tld_length", 3.0);
        raw.insert("f1_url_length", 20.0);
        raw.insert("not_a_feature", 99.0);

        let vector = assemble(&raw);
        assert_eq!(vector.len(), FEATURE_COUNT);
        assert_eq!(vector.get(0), Some(20.0));
        assert_eq!(vector.get(83), Some(3.0));
        assert_eq!(vector.get_by_name("f55_dns_record"), Some(SENTINEL));
        assert!(!vector.as_slice().contains(&99.0));
    }

    #[test]
    fn test_assemble_empty_mapping() {
        let raw: HashMap<String, f64> = HashMap::new();
        let vector = assemble(&raw);

        let names: Vec<_> = vector.named().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_LAYOUT);
        assert!(vector.is_compatible());
    }

    #[test]
    fn test_to_log_entry() {
        let vector = FeatureVector::new();
        let log = vector.to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert_eq!(log["values"].as_array().map(|v| v.len()), Some(FEATURE_COUNT));
    }
}
