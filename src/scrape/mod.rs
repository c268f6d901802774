//! Evidence scraper: fetch a URL and reduce it to plain text.
//!
//! Failures never propagate. Every network, status or decoding problem is logged and
//! reported as `None`, which callers treat as "skip this source".

mod error;
/// HTML and document text extraction.
pub mod extract;

#[cfg(any(test, feature = "mock"))]
mod mock;


pub use error::ScrapeError;
pub use extract::{ContentKind, content_kind, document_to_text, html_to_text};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockScraper;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, instrument, warn};

use crate::constants::{DEFAULT_SCRAPE_TIMEOUT, SCRAPER_USER_AGENT};

#[async_trait]
pub trait PageScraper: Send + Sync {
    /// Plain text of the page at `url`, or `None` when it cannot be used.
    async fn scrape(&self, url: &str) -> Option<String>;
}

/// HTTP scraper with a fixed timeout and a browser-like `User-Agent`.
#[derive(Debug, Clone)]
pub struct WebScraper {
    client: reqwest::Client,
    timeout: Duration,
}

impl WebScraper {
    pub fn new(timeout: Duration) -> Result<Self, ScrapeError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(SCRAPER_USER_AGENT));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ScrapeError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self { client, timeout })
    }

    pub fn with_default_timeout() -> Result<Self, ScrapeError> {
        Self::new(DEFAULT_SCRAPE_TIMEOUT)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches and extracts, reporting why a page was unusable.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let text = match content_kind(url) {
            ContentKind::Document => {
                let bytes = response.bytes().await?;
                // Parsing is CPU-bound and may panic on hostile input; both stay off the runtime.
                tokio::task::spawn_blocking(move || document_to_text(&bytes))
                    .await
                    .map_err(|e| ScrapeError::Task {
                        reason: e.to_string(),
                    })??
            }
            ContentKind::Html => {
                let body = response.text().await?;
                html_to_text(&body)
            }
        };

        if text.trim().is_empty() {
            return Err(ScrapeError::EmptyContent);
        }
        Ok(text)
    }
}

#[async_trait]
impl PageScraper for WebScraper {
    #[instrument(skip(self))]
    async fn scrape(&self, url: &str) -> Option<String> {
        match self.fetch_text(url).await {
            Ok(text) => {
                debug!(chars = text.len(), "Scraped page");
                Some(text)
            }
            Err(e) => {
                warn!(error = %e, "Error scraping page");
                None
            }
        }
    }
}
