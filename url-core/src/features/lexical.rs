//! Lexical Feature Extractor
//!
//! Pure, synchronous and total: every string (including `""`) maps to a full
//! feature vector. Lengths count characters, substring counts are
//! non-overlapping left to right, and every ratio or average over an empty
//! component is `0`.
//!
//! The redirect slots are pinned to the sentinel here and `f55_dns_record` is
//! left unset; only [`crate::network`] fills them.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::url_parts::{DomainParts, UrlParts};
use super::vector::{assemble, FeatureVector};
use crate::constants::{
    BRANDS, PHISH_HINTS, RANDOM_DOMAIN_VOWEL_RATIO, SENTINEL, SERVER_CLIENT_WORDS,
    SHORTENING_SERVICES, SUSPICIOUS_EXTENSIONS, SUSPICIOUS_TLDS,
};

/// Raw name → value mapping before assembly
pub type RawFeatures = HashMap<&'static str, f64>;

static IP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{1,3}(?:\.[0-9]{1,3}){3}$").expect("static regex"));
static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9]+").expect("static regex"));
static ABNORMAL_SUBDOMAIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^w+[0-9]*$").expect("static regex"));

/// Whole-URL symbol tallies, in slot order f4..f19
const SYMBOL_TALLIES: &[(&str, &str)] = &[
    ("f4_dot", "."),
    ("f5_hyphen", "-"),
    ("f6_at", "@"),
    ("f7_question", "?"),
    ("f8_ampersand", "&"),
    ("f9_pipe", "|"),
    ("f10_equal", "="),
    ("f11_underscore", "_"),
    ("f12_tilde", "~"),
    ("f13_percent", "%"),
    ("f14_slash", "/"),
    ("f15_asterisk", "*"),
    ("f16_colon", ":"),
    ("f17_comma", ","),
    ("f18_semicolon", ";"),
    ("f19_dollar", "$"),
];

/// Extract the full lexical vector for a URL
pub fn extract(url: &str) -> FeatureVector {
    assemble(&extract_raw(url))
}

/// Extract lexical features as an unordered mapping
///
/// The network augmenter patches this mapping before assembling.
pub fn extract_raw(url: &str) -> RawFeatures {
    let parts = UrlParts::parse(url);
    let domain = DomainParts::parse(url);

    let netloc = parts.netloc.as_str();
    let path = parts.path.as_str();
    let query = parts.query.as_str();
    let subdomain = domain.subdomain.as_str();
    let suffix = domain.suffix.as_str();

    let url_lower = url.to_lowercase();
    let domain_lower = domain.domain.to_lowercase();
    let subdomain_lower = subdomain.to_lowercase();
    let path_lower = path.to_lowercase();

    let mut f = RawFeatures::with_capacity(96);

    // Lengths & IP literal
    f.insert("f1_url_length", char_len(url));
    f.insert("f2_hostname_length", char_len(netloc));
    f.insert("f3_has_ip", flag(IP_PATTERN.is_match(netloc)));

    // Character tallies
    for &(name, symbol) in SYMBOL_TALLIES {
        f.insert(name, count(url, symbol));
    }
    f.insert("f20_space_or_%20", count(url, "%20") + count(url, " "));
    f.insert("f21_www_count", count(&url_lower, "www"));
    f.insert("f22_dotcom_count", count(&url_lower, ".com"));
    f.insert("f23_http_count", count(&url_lower, "http"));
    f.insert("f24_double_slash_count", count(url, "//"));

    // Structural flags
    f.insert("f25_https", flag(parts.scheme == "https"));
    f.insert("f26_digit_ratio_url", digit_ratio(url));
    f.insert("f27_digit_ratio_hostname", digit_ratio(netloc));
    f.insert("f28_punycode", flag(netloc.contains("xn--")));
    f.insert("f29_port", flag(parts.port().is_some_and(|p| p != 0)));
    f.insert("f30_tld_in_path", flag(!suffix.is_empty() && path.contains(suffix)));
    f.insert(
        "f31_tld_in_subdomain",
        flag(!suffix.is_empty() && subdomain.contains(suffix)),
    );
    f.insert(
        "f32_abnormal_subdomain",
        flag(
            !subdomain.is_empty()
                && subdomain_lower != "www"
                && ABNORMAL_SUBDOMAIN.is_match(subdomain),
        ),
    );
    f.insert(
        "f33_subdomain_count",
        if subdomain.is_empty() {
            0.0
        } else {
            subdomain.split('.').count() as f64
        },
    );
    f.insert("f34_prefix_suffix", flag(domain.domain.contains('-')));
    f.insert("f35_random_domain", flag(looks_random(&domain.domain)));
    f.insert(
        "f36_shortening_service",
        flag(SHORTENING_SERVICES.contains(&netloc.to_lowercase().as_str())),
    );
    f.insert(
        "f37_suspicious_extension",
        flag(SUSPICIOUS_EXTENSIONS.iter().any(|ext| path_lower.ends_with(ext))),
    );

    // Filled by the network augmenter
    f.insert("f38_redirection_count", SENTINEL);
    f.insert("f39_external_redirections", SENTINEL);

    // Words
    let url_words = WordStats::of(url);
    let host_words = WordStats::of(netloc);
    let path_words = WordStats::of(path);

    f.insert("f40_word_count_url", url_words.count as f64);
    f.insert("f41_max_char_repeat", max_char_repeat(url) as f64);
    f.insert("f42_shortest_word_length_url", url_words.shortest as f64);
    f.insert("f43_word_count_hostname", host_words.count as f64);
    f.insert("f44_word_count_path", path_words.count as f64);
    f.insert("f45_longest_word_length_url", url_words.longest as f64);
    f.insert("f46_longest_word_length_hostname", host_words.longest as f64);
    f.insert("f47_longest_word_length_path", path_words.longest as f64);
    f.insert("f48_avg_word_length_url", url_words.average());
    f.insert("f49_avg_word_length_hostname", host_words.average());
    f.insert("f50_avg_word_length_path", path_words.average());

    // Keywords & brands
    f.insert(
        "f51_phish_hints",
        PHISH_HINTS.iter().map(|word| count(&url_lower, word)).sum(),
    );
    f.insert("f52_brand_in_domain", flag(contains_any(&domain_lower, BRANDS)));
    f.insert("f53_brand_in_subdomain", flag(contains_any(&subdomain_lower, BRANDS)));
    f.insert("f54_brand_in_path", flag(contains_any(&path_lower, BRANDS)));

    f.insert(
        "f56_suspicious_tld",
        flag(SUSPICIOUS_TLDS.contains(&suffix.to_lowercase().as_str())),
    );

    // Netloc micro counts
    f.insert("f57_qty_dot_domain", count(netloc, "."));
    f.insert("f58_qty_hyphen_domain", count(netloc, "-"));
    f.insert("f59_qty_underscore_domain", count(netloc, "_"));
    f.insert("f60_qty_at_domain", count(netloc, "@"));
    f.insert("f61_qty_percent_domain", count(netloc, "%"));

    // Path micro counts
    f.insert("f62_qty_dot_path", count(path, "."));
    f.insert("f63_qty_hyphen_path", count(path, "-"));
    f.insert("f64_qty_slash_path", count(path, "/"));
    f.insert("f65_qty_question_path", count(path, "?"));
    f.insert("f66_qty_equal_path", count(path, "="));

    // Query micro counts
    f.insert("f67_qty_dot_query", count(query, "."));
    f.insert("f68_qty_hyphen_query", count(query, "-"));
    f.insert("f69_qty_equal_query", count(query, "="));
    f.insert("f70_qty_ampersand_query", count(query, "&"));
    f.insert("f71_qty_percent_query", count(query, "%"));

    // Sizes & structure
    f.insert("f72_length_domain", char_len(netloc));
    f.insert("f73_length_path", char_len(path));
    f.insert("f74_length_query", char_len(query));
    f.insert(
        "f75_number_of_directories",
        if path.is_empty() || path == "/" {
            0.0
        } else {
            count(path, "/")
        },
    );
    f.insert(
        "f76_number_of_query_params",
        if query.is_empty() {
            0.0
        } else {
            query.split('&').count() as f64
        },
    );
    f.insert("f77_presence_of_fragment", flag(!parts.fragment.is_empty()));
    f.insert("f78_number_of_encoded_chars", count(url, "%"));
    f.insert("f79_presence_of_email", flag(url_lower.contains("mailto:")));
    f.insert("f80_digit_ratio_domain", digit_ratio(netloc));
    f.insert("f81_special_char_ratio_path", special_ratio(path));
    f.insert("f82_is_encoded", flag(url.contains('%')));
    f.insert(
        "f83_server_client_domain",
        flag(contains_any(&domain_lower, SERVER_CLIENT_WORDS)),
    );
    f.insert("f84_tld_length", char_len(suffix));

    f
}

// ============================================================================
// HELPERS
// ============================================================================

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn char_len(s: &str) -> f64 {
    s.chars().count() as f64
}

/// Non-overlapping substring count
fn count(haystack: &str, needle: &str) -> f64 {
    haystack.matches(needle).count() as f64
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn digit_ratio(s: &str) -> f64 {
    let digits = s.chars().filter(|c| c.is_numeric()).count();
    ratio(digits, s.chars().count())
}

fn special_ratio(s: &str) -> f64 {
    let special = s.chars().filter(|c| !c.is_alphanumeric()).count();
    ratio(special, s.chars().count())
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

fn looks_random(domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    let vowels = domain
        .to_lowercase()
        .chars()
        .filter(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
        .count();
    ratio(vowels, domain.chars().count()) < RANDOM_DOMAIN_VOWEL_RATIO
}

/// Longest run of one repeated character
fn max_char_repeat(s: &str) -> usize {
    let mut best = 0;
    let mut current = 0;
    let mut previous = None;

    for c in s.chars() {
        if previous == Some(c) {
            current += 1;
        } else {
            previous = Some(c);
            current = 1;
        }
        best = best.max(current);
    }

    best
}

/// Word statistics over maximal ASCII alphanumeric runs
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct WordStats {
    count: usize,
    shortest: usize,
    longest: usize,
    total: usize,
}

impl WordStats {
    fn of(s: &str) -> Self {
        let mut stats = WordStats::default();

        for word in WORD_PATTERN.find_iter(s) {
            let len = word.as_str().len();
            stats.shortest = if stats.count == 0 { len } else { stats.shortest.min(len) };
            stats.longest = stats.longest.max(len);
            stats.total += len;
            stats.count += 1;
        }

        stats
    }

    fn average(&self) -> f64 {
        ratio(self.total, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_stats() {
        let stats = WordStats::of("http://ab.cde/f");
        assert_eq!(stats.count, 4);
        assert_eq!(stats.shortest, 1);
        assert_eq!(stats.longest, 4);
        assert!((stats.average() - 10.0 / 4.0).abs() < 1e-12);

        assert_eq!(WordStats::of("/-/").average(), 0.0);
    }

    #[test]
    fn test_max_char_repeat() {
        assert_eq!(max_char_repeat(""), 0);
        assert_eq!(max_char_repeat("abc"), 1);
        assert_eq!(max_char_repeat("http://aaaa.com///"), 4);
    }

    #[test]
    fn test_count_is_non_overlapping() {
        assert_eq!(count("wwww", "www"), 1.0);
        assert_eq!(count("%20%20", "%20"), 2.0);
        assert_eq!(count("", "."), 0.0);
    }

    #[test]
    fn test_ratios_guard_zero_denominators() {
        assert_eq!(digit_ratio(""), 0.0);
        assert_eq!(special_ratio(""), 0.0);
        assert_eq!(digit_ratio("a1"), 0.5);
        assert_eq!(special_ratio("/a"), 0.5);
    }

    #[test]
    fn test_looks_random() {
        assert!(!looks_random(""));
        assert!(looks_random("xkcdqz"));
        assert!(!looks_random("example"));
    }

    #[test]
    fn test_raw_leaves_dns_unset() {
        let raw = extract_raw("http://example.com/");
        assert!(!raw.contains_key("f55_dns_record"));
        assert_eq!(raw.len(), 83);
    }
}
