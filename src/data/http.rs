//! HTTP retrieval.
//!
//! One GET per call, no retries, no auth beyond optional request headers. A
//! transport error or timeout is `FeedError::Network`; any non-2xx answer is
//! `FeedError::HttpStatus`. Retry policy, where a feed has one, lives with that
//! feed (see `dated`).

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{AppError, EXIT_RUNTIME, FeedError};

const USER_AGENT: &str = concat!("threat-digest/", env!("CARGO_PKG_VERSION"));

/// Something that can GET a URL and hand back the body as text.
///
/// The pipeline only talks to the network through this trait so tests can
/// script responses.
pub trait Fetch: Send + Sync {
    fn fetch_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FeedError>;

    fn fetch(&self, url: &str) -> Result<String, FeedError> {
        self.fetch_with_headers(url, &[])
    }
}

/// `Fetch` backed by a blocking reqwest client.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, timeout })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_with_headers(&self, url: &str, headers: &[(&str, &str)]) -> Result<String, FeedError> {
        debug!(url, "GET");

        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let resp = req.send().map_err(|e| FeedError::Network {
            url: url.to_string(),
            detail: if e.is_timeout() {
                format!("timed out after {}s", self.timeout.as_secs())
            } else {
                e.to_string()
            },
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|e| {
            if e.is_timeout() {
                FeedError::Network {
                    url: url.to_string(),
                    detail: format!("timed out after {}s while reading body", self.timeout.as_secs()),
                }
            } else {
                FeedError::Decode {
                    detail: format!("{url}: {e}"),
                }
            }
        })
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MockFetcher;
    use super::*;

    #[test]
    fn mock_serves_scripted_bodies_and_404s_the_rest() {
        let fetcher = MockFetcher::new().with_body("https://feeds.test/a", "hello");

        assert_eq!(fetcher.fetch("https://feeds.test/a").unwrap(), "hello");
        let err = fetcher.fetch("https://feeds.test/b").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            fetcher.requests(),
            vec!["https://feeds.test/a".to_string(), "https://feeds.test/b".to_string()]
        );
    }

    #[test]
    fn client_builds_with_timeout() {
        assert!(HttpFetcher::new(Duration::from_secs(5)).is_ok());
    }
}
