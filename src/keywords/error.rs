use thiserror::Error;

use crate::reasoning::ReasoningError;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("reasoning error: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("malformed keyword response: {reason}")]
    MalformedResponse { reason: String },
}
