use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("search service returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed search response: {reason}")]
    MalformedResponse { reason: String },

    #[error("search is not configured: {reason}")]
    NotConfigured { reason: String },
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::RequestFailed {
            reason: err.to_string(),
        }
    }
}
