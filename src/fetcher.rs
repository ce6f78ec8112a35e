use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::config::HttpConfig;

/// Why a page fetch failed. The tags exist for diagnostics; the pipeline
/// treats all three the same way (source unavailable).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("no response from host: {0}")]
    NoResponse(String),
    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),
}

/// Bounded-timeout GET for a single page.
///
/// Sends a browser User-Agent (several hosts refuse default automated
/// clients) and uses the fetch timeout from [`HttpConfig`], which is
/// longer than the search timeout so that slow article pages still get
/// a chance once the result set is in.
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
}

impl PageFetcher {
    pub fn new(config: &HttpConfig) -> PageFetcher {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("failed to build HTTP client");

        PageFetcher {
            client,
            timeout: config.fetch_timeout,
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("fetching page: {url}");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::NoResponse(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::NoResponse(e.to_string()))
    }
}
