//! Central Configuration Constants
//!
//! Single source of truth for core defaults and the fixed vocabularies the
//! trained model was fit against. Changing any vocabulary here changes feature
//! values and requires retraining.

/// Sentinel for a feature slot that was never computed
pub const SENTINEL: f64 = -1.0;

/// Decision threshold (strictly greater means phishing)
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Total budget for one redirect-following fetch (seconds)
pub const DEFAULT_REDIRECT_TIMEOUT_SECS: u64 = 5;

/// Maximum redirect hops before the chain counts as failed
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// DNS memo capacity (hostnames)
pub const DEFAULT_DNS_CACHE_CAPACITY: usize = 10_000;

/// Concurrent URLs in one batch augmentation run
pub const DEFAULT_BATCH_CONCURRENCY: usize = 32;

// ============================================
// Vocabularies
// ============================================

/// Known link shorteners (compared against the lower-cased netloc)
pub const SHORTENING_SERVICES: &[&str] = &[
    "bit.ly", "tinyurl.com", "goo.gl", "ow.ly", "t.co", "is.gd", "buff.ly", "adf.ly",
];

/// Path endings treated as suspicious downloads
pub const SUSPICIOUS_EXTENSIONS: &[&str] = &[".exe", ".js", ".txt"];

/// Phishing hint keywords, counted in the lower-cased URL
pub const PHISH_HINTS: &[&str] = &[
    "login", "signin", "verify", "account", "update", "secure", "confirm",
    "bank", "paypal", "ebay", "admin", "security", "password",
];

/// Brand names looked for in domain, subdomain and path
pub const BRANDS: &[&str] = &[
    "google", "facebook", "amazon", "paypal", "apple", "microsoft", "ebay",
];

/// Free or abuse-heavy TLDs
pub const SUSPICIOUS_TLDS: &[&str] = &["tk", "ml", "ga", "cf", "gq"];

/// Words hinting at infrastructure-themed lures
pub const SERVER_CLIENT_WORDS: &[&str] = &["server", "client"];

/// Vowel share under which a registrable domain looks random
pub const RANDOM_DOMAIN_VOWEL_RATIO: f64 = 0.3;
