//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The trained scaler and classifier consume features purely by position, so
//! the order below is the contract with the model.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION and retrain
//! 2. Change order → increment FEATURE_VERSION and retrain
//! 3. Remove feature → increment FEATURE_VERSION and retrain

use std::collections::HashMap;

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Lengths & IP literal (0-2) ===
    "f1_url_length",
    "f2_hostname_length",
    "f3_has_ip",

    // === Whole-URL character tallies (3-19) ===
    "f4_dot",
    "f5_hyphen",
    "f6_at",
    "f7_question",
    "f8_ampersand",
    "f9_pipe",
    "f10_equal",
    "f11_underscore",
    "f12_tilde",
    "f13_percent",
    "f14_slash",
    "f15_asterisk",
    "f16_colon",
    "f17_comma",
    "f18_semicolon",
    "f19_dollar",
    "f20_space_or_%20",

    // === Token tallies (20-23) ===
    "f21_www_count",
    "f22_dotcom_count",
    "f23_http_count",
    "f24_double_slash_count",

    // === Structural flags (24-36) ===
    "f25_https",
    "f26_digit_ratio_url",
    "f27_digit_ratio_hostname",
    "f28_punycode",
    "f29_port",
    "f30_tld_in_path",
    "f31_tld_in_subdomain",
    "f32_abnormal_subdomain",
    "f33_subdomain_count",
    "f34_prefix_suffix",
    "f35_random_domain",
    "f36_shortening_service",
    "f37_suspicious_extension",

    // === Network placeholders (37-38) ===
    "f38_redirection_count",
    "f39_external_redirections",

    // === Words (39-49) ===
    "f40_word_count_url",
    "f41_max_char_repeat",
    "f42_shortest_word_length_url",
    "f43_word_count_hostname",
    "f44_word_count_path",
    "f45_longest_word_length_url",
    "f46_longest_word_length_hostname",
    "f47_longest_word_length_path",
    "f48_avg_word_length_url",
    "f49_avg_word_length_hostname",
    "f50_avg_word_length_path",

    // === Keywords, brands, DNS, TLD (50-55) ===
    "f51_phish_hints",
    "f52_brand_in_domain",
    "f53_brand_in_subdomain",
    "f54_brand_in_path",
    "f55_dns_record",
    "f56_suspicious_tld",

    // === Per-component micro counts (56-70) ===
    "f57_qty_dot_domain",
    "f58_qty_hyphen_domain",
    "f59_qty_underscore_domain",
    "f60_qty_at_domain",
    "f61_qty_percent_domain",
    "f62_qty_dot_path",
    "f63_qty_hyphen_path",
    "f64_qty_slash_path",
    "f65_qty_question_path",
    "f66_qty_equal_path",
    "f67_qty_dot_query",
    "f68_qty_hyphen_query",
    "f69_qty_equal_query",
    "f70_qty_ampersand_query",
    "f71_qty_percent_query",

    // === Sizes & structure (71-83) ===
    "f72_length_domain",
    "f73_length_path",
    "f74_length_query",
    "f75_number_of_directories",
    "f76_number_of_query_params",
    "f77_presence_of_fragment",
    "f78_number_of_encoded_chars",
    "f79_presence_of_email",
    "f80_digit_ratio_domain",
    "f81_special_char_ratio_path",
    "f82_is_encoded",
    "f83_server_client_domain",
    "f84_tld_length",
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 84;

/// Name → slot lookup
static FEATURE_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    FEATURE_LAYOUT
        .iter()
        .enumerate()
        .map(|(i, &name)| (name, i))
        .collect()
});

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Get layout hash (computed once)
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information, served to clients that ship their own scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_INDEX.get(name).copied()
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 84);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_names_are_unique_and_numbered_in_order() {
        assert_eq!(FEATURE_INDEX.len(), FEATURE_COUNT);

        for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
            let prefix = format!("f{}_", i + 1);
            assert!(name.starts_with(&prefix), "{name} out of place at slot {i}");
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), compute_layout_hash());
        assert_eq!(layout_hash(), compute_layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_validate_layout() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(validate_layout(FEATURE_VERSION + 1, layout_hash()).is_err());

        let err = validate_layout(FEATURE_VERSION, layout_hash() ^ 1).unwrap_err();
        assert_eq!(err.expected_hash, layout_hash());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("f1_url_length"), Some(0));
        assert_eq!(feature_index("f20_space_or_%20"), Some(19));
        assert_eq!(feature_index("f55_dns_record"), Some(54));
        assert_eq!(feature_index("f84_tld_length"), Some(83));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("f1_url_length"));
        assert_eq!(feature_name(37), Some("f38_redirection_count"));
        assert_eq!(feature_name(84), None);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
