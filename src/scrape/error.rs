use thiserror::Error;

/// Reasons a page could not be scraped. Logged, never surfaced to callers.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to build HTTP client: {reason}")]
    Client { reason: String },

    #[error("request failed: {reason}")]
    Request { reason: String },

    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("document extraction failed: {reason}")]
    Document { reason: String },

    #[error("extraction task failed: {reason}")]
    Task { reason: String },

    #[error("no text extracted")]
    EmptyContent,
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::Request {
            reason: err.to_string(),
        }
    }
}
