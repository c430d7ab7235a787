//! Network Feature Augmenter
//!
//! Patches the three network slots of a lexical vector:
//! `f38_redirection_count`, `f39_external_redirections` and `f55_dns_record`.
//! Failures never surface; they degrade to `-1` (redirects) or `0` (DNS).

pub mod dns;
pub mod redirects;

use std::sync::Arc;

pub use dns::{DnsCache, DnsCacheStats};
pub use redirects::{ProbeConfig, RedirectProbe, RedirectStats};

use crate::features::{assemble, lexical, FeatureVector, UrlParts};

/// Lexical extraction plus network signals
#[derive(Clone)]
pub struct NetworkAugmenter {
    probe: RedirectProbe,
    dns: Arc<DnsCache>,
}

impl NetworkAugmenter {
    pub fn new(probe: RedirectProbe, dns: Arc<DnsCache>) -> Self {
        Self { probe, dns }
    }

    /// Build with its own HTTP client and a fresh DNS cache
    pub fn with_config(config: ProbeConfig, dns_capacity: usize) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            RedirectProbe::new(config)?,
            Arc::new(DnsCache::new(dns_capacity)),
        ))
    }

    pub fn dns(&self) -> &DnsCache {
        &self.dns
    }

    /// Redirect statistics for one URL
    pub async fn augment(&self, url: &str) -> RedirectStats {
        self.probe.probe(url).await
    }

    /// Full vector: lexical features, redirect chain and DNS presence
    pub async fn extract_all(&self, url: &str) -> FeatureVector {
        let mut raw = lexical::extract_raw(url);
        let hostname = UrlParts::parse(url).netloc;

        let (redirects, dns_record) =
            tokio::join!(self.augment(url), self.dns.resolves(&hostname));

        raw.insert("f38_redirection_count", f64::from(redirects.redirect_count));
        raw.insert("f39_external_redirections", f64::from(redirects.external_redirects));
        raw.insert("f55_dns_record", f64::from(dns_record));

        assemble(&raw)
    }
}
