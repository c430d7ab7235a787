//! Configuration module

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use phishlens_core::constants::{
    DEFAULT_BATCH_CONCURRENCY, DEFAULT_DNS_CACHE_CAPACITY, DEFAULT_MAX_REDIRECTS,
    DEFAULT_REDIRECT_TIMEOUT_SECS, DEFAULT_THRESHOLD,
};
use phishlens_core::model::ThresholdConfig;
use phishlens_core::network::ProbeConfig;
use phishlens_core::BatchConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Exported ONNX classifier
    pub model_path: PathBuf,

    /// Fitted scaler parameters (JSON)
    pub scaler_path: PathBuf,

    /// Prediction log
    pub output_csv: PathBuf,

    /// Directory holding the `index.html` served at `/`
    pub static_dir: PathBuf,

    /// Probability above which a URL is phishing
    pub phishing_threshold: f32,

    pub redirect_timeout_secs: u64,
    pub max_redirects: usize,
    pub dns_cache_capacity: usize,

    /// Concurrent URLs during batch feature extraction
    pub batch_concurrency: usize,

    /// Request body cap (uploads included)
    pub max_upload_bytes: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            model_path: PathBuf::from("model/phishing_cnn.onnx"),
            scaler_path: PathBuf::from("model/scaler.json"),
            output_csv: PathBuf::from("results.csv"),
            static_dir: PathBuf::from("."),
            phishing_threshold: DEFAULT_THRESHOLD,
            redirect_timeout_secs: DEFAULT_REDIRECT_TIMEOUT_SECS,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            dns_cache_capacity: DEFAULT_DNS_CACHE_CAPACITY,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            max_upload_bytes: 10 * 1024 * 1024,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parsed("PORT").unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            scaler_path: env::var("SCALER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.scaler_path),

            output_csv: env::var("OUTPUT_CSV")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_csv),

            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),

            phishing_threshold: parsed("PHISHING_THRESHOLD")
                .unwrap_or(defaults.phishing_threshold),

            redirect_timeout_secs: parsed("REDIRECT_TIMEOUT_SECS")
                .unwrap_or(defaults.redirect_timeout_secs),

            max_redirects: parsed("MAX_REDIRECTS").unwrap_or(defaults.max_redirects),

            dns_cache_capacity: parsed("DNS_CACHE_CAPACITY")
                .unwrap_or(defaults.dns_cache_capacity),

            batch_concurrency: parsed("BATCH_CONCURRENCY").unwrap_or(defaults.batch_concurrency),

            max_upload_bytes: parsed("MAX_UPLOAD_BYTES").unwrap_or(defaults.max_upload_bytes),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn threshold(&self) -> ThresholdConfig {
        ThresholdConfig::new(self.phishing_threshold)
    }

    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            timeout: Duration::from_secs(self.redirect_timeout_secs),
            max_redirects: self.max_redirects,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            max_concurrency: self.batch_concurrency,
        }
    }

    pub fn index_html(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }

    /// File name offered to download clients
    pub fn output_file_name(&self) -> String {
        self.output_csv
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "results.csv".to_string())
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.threshold().base_threshold, 0.5);
        assert_eq!(config.probe_config().timeout, Duration::from_secs(5));
        assert_eq!(config.batch_config().max_concurrency, 32);
        assert_eq!(config.output_file_name(), "results.csv");
        assert_eq!(config.index_html(), PathBuf::from("./index.html"));
        assert!(!config.is_production());
    }
}
