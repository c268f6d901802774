//! Language-model reasoning calls.
//!
//! The pipeline only needs "rendered prompt in, text out", optionally with a hint that the
//! answer must be a JSON object. [`GenaiReasoner`] is the production adapter.

mod error;
mod provider;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use error::ReasoningError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockReasoner;
pub use provider::GenaiReasoner;

use async_trait::async_trait;

/// Structured-output hint passed with a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    /// The model must answer with a single JSON object.
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    pub prompt: String,
    pub format: ResponseFormat,
    pub temperature: f64,
}

impl ReasoningRequest {
    pub fn text(prompt: impl Into<String>, temperature: f64) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Text,
            temperature,
        }
    }

    pub fn json(prompt: impl Into<String>, temperature: f64) -> Self {
        Self {
            prompt: prompt.into(),
            format: ResponseFormat::Json,
            temperature,
        }
    }
}

#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Runs one completion and returns the model's text.
    async fn complete(&self, request: ReasoningRequest) -> Result<String, ReasoningError>;
}
