//! Redirect chain probing
//!
//! Follows redirects by hand (the client itself never follows them) so every
//! intermediate hop is visible. Any failure collapses to
//! [`RedirectStats::FAILED`]; nothing is retried.

use std::time::Duration;

use reqwest::header::LOCATION;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use url::{Position, Url};

use crate::constants::{DEFAULT_MAX_REDIRECTS, DEFAULT_REDIRECT_TIMEOUT_SECS};
use crate::features::UrlParts;

/// Redirect chain summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectStats {
    pub redirect_count: i32,
    pub external_redirects: i32,
}

impl RedirectStats {
    pub const FAILED: Self = Self {
        redirect_count: -1,
        external_redirects: -1,
    };
}

#[derive(Debug, Error)]
enum ProbeError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unreadable Location header")]
    BadLocation,
    #[error("more than {0} redirects")]
    TooManyRedirects(usize),
    #[error("timed out")]
    Timeout,
}

/// Probe settings
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Budget for the whole chain
    pub timeout: Duration,
    pub max_redirects: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REDIRECT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Redirect prober sharing one connection pool
#[derive(Debug, Clone)]
pub struct RedirectProbe {
    client: Client,
    config: ProbeConfig,
}

impl RedirectProbe {
    pub fn new(config: ProbeConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, config })
    }

    /// Count redirects and off-host redirects for `url`
    pub async fn probe(&self, url: &str) -> RedirectStats {
        let chain = tokio::time::timeout(self.config.timeout, self.follow_chain(url)).await;

        let history = match chain {
            Ok(Ok(history)) => history,
            Ok(Err(e)) => {
                tracing::debug!("Redirect probe failed for {}: {}", url, e);
                return RedirectStats::FAILED;
            }
            Err(_) => {
                tracing::debug!("Redirect probe failed for {}: {}", url, ProbeError::Timeout);
                return RedirectStats::FAILED;
            }
        };

        let original_host = UrlParts::parse(url).netloc.to_lowercase();
        let external = history
            .iter()
            .filter(|hop| netloc(hop).to_lowercase() != original_host)
            .count();

        RedirectStats {
            redirect_count: history.len() as i32,
            external_redirects: external as i32,
        }
    }

    /// URLs of every response that redirected, in order
    async fn follow_chain(&self, url: &str) -> Result<Vec<Url>, ProbeError> {
        let mut current = Url::parse(url)?;
        let mut history = Vec::new();

        loop {
            let response = self.client.get(current.clone()).send().await?;

            if !is_followed_redirect(response.status()) {
                return Ok(history);
            }
            let Some(location) = response.headers().get(LOCATION) else {
                return Ok(history);
            };

            let location = location.to_str().map_err(|_| ProbeError::BadLocation)?;
            let next = current.join(location)?;

            history.push(current);
            if history.len() >= self.config.max_redirects {
                return Err(ProbeError::TooManyRedirects(self.config.max_redirects));
            }
            current = next;
        }
    }
}

fn is_followed_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// `user:pass@host:port` slice of a parsed URL
fn netloc(url: &Url) -> &str {
    &url[Position::BeforeUsername..Position::AfterPort]
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn probe() -> RedirectProbe {
        RedirectProbe::new(ProbeConfig {
            timeout: Duration::from_secs(2),
            max_redirects: 10,
        })
        .unwrap()
    }

    fn redirect_to(location: &str) -> ResponseTemplate {
        ResponseTemplate::new(302).insert_header("Location", location)
    }

    #[tokio::test]
    async fn test_no_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let stats = probe().probe(&format!("{}/", server.uri())).await;
        assert_eq!(stats, RedirectStats { redirect_count: 0, external_redirects: 0 });
    }

    #[tokio::test]
    async fn test_internal_chain() {
        let server = MockServer::start().await;
        Mock::given(path("/a")).respond_with(redirect_to("/b")).mount(&server).await;
        Mock::given(path("/b")).respond_with(redirect_to("/c")).mount(&server).await;
        Mock::given(path("/c"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let stats = probe().probe(&format!("{}/a", server.uri())).await;
        assert_eq!(stats, RedirectStats { redirect_count: 2, external_redirects: 0 });
    }

    #[tokio::test]
    async fn test_external_hops_are_counted_by_netloc() {
        let origin = MockServer::start().await;
        let other = MockServer::start().await;

        Mock::given(path("/start"))
            .respond_with(redirect_to(&format!("{}/hop", other.uri())))
            .mount(&origin)
            .await;
        Mock::given(path("/hop"))
            .respond_with(redirect_to("/end"))
            .mount(&other)
            .await;
        Mock::given(path("/end"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&other)
            .await;

        let stats = probe().probe(&format!("{}/start", origin.uri())).await;
        // Origin hop is internal, the hop on the second server is not
        assert_eq!(stats, RedirectStats { redirect_count: 2, external_redirects: 1 });
    }

    #[tokio::test]
    async fn test_redirect_loop_fails() {
        let server = MockServer::start().await;
        Mock::given(path("/loop")).respond_with(redirect_to("/loop")).mount(&server).await;

        let stats = probe().probe(&format!("{}/loop", server.uri())).await;
        assert_eq!(stats, RedirectStats::FAILED);
    }

    #[tokio::test]
    async fn test_timeout_fails() {
        let server = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let probe = RedirectProbe::new(ProbeConfig {
            timeout: Duration::from_millis(200),
            max_redirects: 10,
        })
        .unwrap();
        assert_eq!(probe.probe(&format!("{}/slow", server.uri())).await, RedirectStats::FAILED);
    }

    #[tokio::test]
    async fn test_unparseable_or_unreachable_url_fails() {
        assert_eq!(probe().probe("not a url").await, RedirectStats::FAILED);
        assert_eq!(probe().probe("http://127.0.0.1:1/").await, RedirectStats::FAILED);
    }

    #[test]
    fn test_netloc_slice() {
        let url = Url::parse("http://u:p@example.com:8080/x?y").unwrap();
        assert_eq!(netloc(&url), "u:p@example.com:8080");

        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(netloc(&url), "example.com");
    }
}
