//! HTTP feed fetcher with bounded timeout and a fixed user agent.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use newswire_core::{defaults, Error, Result};

/// Fetches feed documents over HTTP/HTTPS.
///
/// Every failure mode (connect error, timeout, non-success status) maps to
/// `Error::Network`, which the ingestion pipeline absorbs per feed.
#[derive(Clone)]
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(defaults::FEED_FETCH_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom timeout. Fails when the HTTP client
    /// cannot be built (TLS backend initialization), rather than falling
    /// back to a client without the timeout and user agent.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(defaults::FEED_USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("building feed HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch a feed document, returning its body as text.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("GET {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("GET {url} returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("reading body of {url} failed: {e}")))?;

        debug!(
            subsystem = "feed",
            component = "fetcher",
            feed_url = url,
            result_count = body.len(),
            "Fetched feed document"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body_with_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", defaults::FEED_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_string("<rss/>"))
            .mount(&server)
            .await;

        let fetcher = FeedFetcher::new().unwrap();
        let body = fetcher.fetch(&server.uri()).await.unwrap();
        assert_eq!(body, "<rss/>");
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = FeedFetcher::new().unwrap().fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_fetcher_construction_succeeds() {
        assert!(FeedFetcher::with_timeout(Duration::from_secs(1)).is_ok());
        assert!(FeedFetcher::new().is_ok());
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let fetcher = FeedFetcher::with_timeout(Duration::from_millis(200)).unwrap();
        let err = fetcher
            .fetch("http://127.0.0.1:1/feed.xml")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }
}
