//! DNS resolution check with a bounded LRU memo
//!
//! The lock is never held across the lookup; two tasks asking for the same
//! uncached host may both resolve it, and the later insert simply overwrites
//! an identical answer.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::constants::DEFAULT_DNS_CACHE_CAPACITY;

/// Memoised `hostname → {0, 1}` resolution results
pub struct DnsCache {
    entries: Mutex<LruCache<String, u8>>,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsCacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl DnsCache {
    /// Create a cache holding at most `capacity` hosts (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: Default::default(),
            misses: Default::default(),
        }
    }

    /// `1` if `hostname` resolves to an IPv4 address, `0` on any failure
    ///
    /// `hostname` is looked up verbatim, so a netloc still carrying a port or
    /// credentials does not resolve. An empty name stands for `0.0.0.0` and
    /// counts as resolved. Hosts with only AAAA records count as unresolved.
    pub async fn resolves(&self, hostname: &str) -> u8 {
        use std::sync::atomic::Ordering;

        let cached = self.entries.lock().get(hostname).copied();
        if let Some(cached) = cached {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return cached;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let result = resolve(hostname).await;
        self.entries.lock().put(hostname.to_string(), result);
        result
    }

    /// Cached answer without resolving
    pub fn peek(&self, hostname: &str) -> Option<u8> {
        self.entries.lock().peek(hostname).copied()
    }

    pub fn stats(&self) -> DnsCacheStats {
        use std::sync::atomic::Ordering;

        let entries = self.entries.lock();
        DnsCacheStats {
            entries: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for DnsCache {
    fn default() -> Self {
        Self::new(DEFAULT_DNS_CACHE_CAPACITY)
    }
}

async fn resolve(hostname: &str) -> u8 {
    // INADDR_ANY
    if hostname.is_empty() {
        return 1;
    }

    match tokio::net::lookup_host((hostname, 0)).await {
        Ok(mut addrs) => u8::from(addrs.any(|addr| addr.is_ipv4())),
        Err(e) => {
            tracing::debug!("DNS lookup failed for {}: {}", hostname, e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ip_literal_resolves_and_is_cached() {
        let cache = DnsCache::new(4);
        assert_eq!(cache.resolves("127.0.0.1").await, 1);
        assert_eq!(cache.resolves("127.0.0.1").await, 1);

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test]
    async fn test_empty_hostname_is_any_address() {
        let cache = DnsCache::new(4);
        assert_eq!(cache.resolves("").await, 1);
        assert_eq!(cache.peek(""), Some(1));
    }

    #[tokio::test]
    async fn test_ipv6_only_host_is_unresolved() {
        let cache = DnsCache::new(4);
        assert_eq!(cache.resolves("::1").await, 0);
        assert_eq!(cache.resolves("127.0.0.1").await, 1);
    }

    #[tokio::test]
    async fn test_failures_resolve_to_zero() {
        let cache = DnsCache::new(4);
        // Netloc with a port is looked up verbatim
        assert_eq!(cache.resolves("127.0.0.1:8080").await, 0);
        assert_eq!(cache.peek("127.0.0.1:8080"), Some(0));
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let cache = DnsCache::new(2);
        cache.resolves("127.0.0.1").await;
        cache.resolves("127.0.0.2").await;
        // Touch the first so the second becomes least recent
        cache.resolves("127.0.0.1").await;
        cache.resolves("127.0.0.3").await;

        assert_eq!(cache.stats().entries, 2);
        assert!(cache.peek("127.0.0.1").is_some());
        assert!(cache.peek("127.0.0.2").is_none());
        assert!(cache.peek("127.0.0.3").is_some());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = DnsCache::new(0);
        assert_eq!(cache.stats().capacity, 1);
    }
}
