//! Top-level error type returned by the pipeline and chat entry points.

use thiserror::Error;

use crate::config::ConfigError;
use crate::embedding::EmbeddingError;
use crate::evidence::ResolutionError;
use crate::keywords::ExtractionError;
use crate::knowledge::KnowledgeError;
use crate::reasoning::ReasoningError;
use crate::scoring::ScoringError;
use crate::scrape::ScrapeError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("project text is empty")]
    EmptyInput,

    #[error("keyword extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("evidence resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),

    #[error("reasoning failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("knowledge cache error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("embedder setup failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("scraper setup failed: {0}")]
    Scraper(#[from] ScrapeError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// `true` for failures of an upstream service or local resource (5xx);
    /// `false` for caller errors.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PipelineError::EmptyInput)
    }

    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::EmptyInput => 400,
            PipelineError::Knowledge(_)
            | PipelineError::Resolution(ResolutionError::Knowledge(_))
            | PipelineError::Scraper(_)
            | PipelineError::Config(_) => 500,
            PipelineError::Extraction(_)
            | PipelineError::Resolution(ResolutionError::Search(_))
            | PipelineError::Scoring(_)
            | PipelineError::Reasoning(_)
            | PipelineError::Embedding(_) => 502,
        }
    }

    /// Single-key error mapping, matching the shape of the scoring error envelope.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({ "error": self.to_string() })
    }
}
