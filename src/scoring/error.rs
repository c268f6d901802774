use thiserror::Error;

use crate::reasoning::ReasoningError;

/// Fatal scoring failures (the reasoning service itself failed).
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("reasoning error: {0}")]
    Reasoning(#[from] ReasoningError),
}

/// Why a scoring response was rejected. Collapsed into the format-error envelope.
#[derive(Debug, Error, PartialEq)]
pub enum ScoreFormatError {
    #[error("response is not valid JSON: {reason}")]
    NotJson { reason: String },

    #[error("response is not a JSON object")]
    NotObject,

    #[error("missing field `{field}`")]
    MissingField { field: &'static str },

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("category `{category}` appears more than once")]
    DuplicateCategory { category: String },

    #[error("missing category `{category}`")]
    MissingCategory { category: String },
}
