//! Batch Orchestrator
//!
//! Runs full extraction (lexical + redirects + DNS) across many URLs on one
//! shared [`NetworkAugmenter`]. At most `max_concurrency` URLs are in flight;
//! results come back in input order and a failing URL still yields a row
//! (with sentinel network slots).

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::constants::DEFAULT_BATCH_CONCURRENCY;
use crate::features::FeatureVector;
use crate::network::NetworkAugmenter;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// URLs processed concurrently (minimum 1)
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }
}

/// Extract augmented vectors for every URL, preserving order
pub async fn process_many<S: AsRef<str>>(
    augmenter: &NetworkAugmenter,
    urls: &[S],
    config: &BatchConfig,
) -> Vec<FeatureVector> {
    let limit = config.max_concurrency.clamp(1, Semaphore::MAX_PERMITS);
    tracing::debug!("Augmenting {} URLs (concurrency {})", urls.len(), limit);

    let semaphore = Semaphore::new(limit);
    let semaphore = &semaphore;

    // Futures own their URL so none borrows from `urls`
    let tasks = urls.iter().map(|url| {
        let url = url.as_ref().to_owned();
        async move {
            let _permit = semaphore.acquire().await.ok();
            augmenter.extract_all(&url).await
        }
    });

    join_all(tasks).await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::network::ProbeConfig;
    use wiremock::matchers::path;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn augmenter() -> NetworkAugmenter {
        NetworkAugmenter::with_config(ProbeConfig::default(), 64).unwrap()
    }

    #[tokio::test]
    async fn test_order_is_preserved_when_later_urls_finish_first() {
        let server = MockServer::start().await;
        for (route, delay_ms) in [("/slow", 400), ("/medium", 200), ("/fast", 0)] {
            Mock::given(path(route))
                .respond_with(
                    ResponseTemplate::new(200).set_delay(Duration::from_millis(delay_ms)),
                )
                .mount(&server)
                .await;
        }

        let urls: Vec<String> = ["/slow", "/medium", "/fast"]
            .iter()
            .map(|route| format!("{}{}", server.uri(), route))
            .collect();

        let vectors = process_many(&augmenter(), &urls, &BatchConfig::default()).await;

        assert_eq!(vectors.len(), urls.len());
        for (url, vector) in urls.iter().zip(&vectors) {
            assert_eq!(
                vector.get_by_name("f1_url_length"),
                Some(url.chars().count() as f64)
            );
            assert_eq!(vector.get_by_name("f38_redirection_count"), Some(0.0));
        }
    }

    #[tokio::test]
    async fn test_failing_url_does_not_disturb_siblings() {
        let server = MockServer::start().await;
        Mock::given(path("/ok"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/done"))
            .mount(&server)
            .await;
        Mock::given(path("/done"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let ok = format!("{}/ok", server.uri());
        let urls = vec![ok.clone(), "http://127.0.0.1:1/down".to_string(), ok];

        let config = BatchConfig { max_concurrency: 2 };
        let vectors = process_many(&augmenter(), &urls, &config).await;

        assert_eq!(vectors.len(), 3);
        assert_eq!(vectors[0].get_by_name("f38_redirection_count"), Some(1.0));
        assert_eq!(vectors[1].get_by_name("f38_redirection_count"), Some(-1.0));
        assert_eq!(vectors[1].get_by_name("f39_external_redirections"), Some(-1.0));
        assert_eq!(vectors[2].get_by_name("f38_redirection_count"), Some(1.0));
    }

    #[tokio::test]
    async fn test_batch_future_is_send() {
        fn assert_send<T: Send>(_: T) {}

        let augmenter = augmenter();
        let urls = vec!["http://127.0.0.1:1/".to_string()];
        let config = BatchConfig::default();
        assert_send(process_many(&augmenter, &urls, &config));
    }

    #[tokio::test]
    async fn test_spawned_batch_on_owned_inputs() {
        let augmenter = augmenter();
        let urls = vec!["not a url".to_string(), "http://127.0.0.1:1/".to_string()];

        let handle = tokio::spawn(async move {
            process_many(&augmenter, &urls, &BatchConfig { max_concurrency: 1 }).await
        });
        let vectors = handle.await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].get_by_name("f1_url_length"), Some(9.0));
        assert_eq!(vectors[1].get_by_name("f38_redirection_count"), Some(-1.0));
    }

    #[tokio::test]
    async fn test_empty_batch_and_zero_concurrency() {
        let empty: Vec<String> = Vec::new();
        let config = BatchConfig { max_concurrency: 0 };
        assert!(process_many(&augmenter(), &empty, &config).await.is_empty());

        let vectors = process_many(&augmenter(), &["not a url"], &config).await;
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors[0].get_by_name("f38_redirection_count"), Some(-1.0));
    }
}
