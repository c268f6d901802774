//! Keyword extraction: project text to topic terms, or an explicit "insufficient" verdict.

mod error;


pub use error::ExtractionError;

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::constants::{
    DEFAULT_MIN_KEYWORD_CATEGORIES, INSUFFICIENT_SENTINEL, KEYWORD_TEMPERATURE, MAX_KEYWORD_CHARS,
    MAX_KEYWORDS, MIN_KEYWORDS,
};
use crate::prompts::{KEYWORD_TEMPLATE, render};
use crate::reasoning::{ReasoningRequest, ReasoningService};

/// Requested keyword count range; responses outside it (but within limits) are accepted.
const REQUESTED_KEYWORDS: std::ops::RangeInclusive<usize> = 5..=7;

/// Result of keyword extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeywordSet {
    Keywords(Vec<String>),
    /// The text does not describe enough of the project to search for evidence.
    Insufficient,
}

impl KeywordSet {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, KeywordSet::Insufficient)
    }

    /// Keywords in response order (empty for [`KeywordSet::Insufficient`]).
    pub fn keywords(&self) -> &[String] {
        match self {
            KeywordSet::Keywords(k) => k,
            KeywordSet::Insufficient => &[],
        }
    }
}

/// Parses a comma-separated keyword response.
pub fn parse_keywords(response: &str) -> Result<KeywordSet, ExtractionError> {
    let cleaned = response
        .trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'')
        .trim()
        .trim_end_matches('.')
        .trim();

    if cleaned.is_empty() {
        return Err(ExtractionError::MalformedResponse {
            reason: "empty response".to_string(),
        });
    }

    let terms: Vec<String> = cleaned
        .split(',')
        .map(|t| {
            t.trim()
                .trim_matches(|c: char| c == '`' || c == '"' || c == '\'')
                .trim()
                .to_string()
        })
        .filter(|t| !t.is_empty())
        .collect();

    if terms
        .iter()
        .any(|t| t.trim_end_matches('.').eq_ignore_ascii_case(INSUFFICIENT_SENTINEL))
    {
        return Ok(KeywordSet::Insufficient);
    }

    if let Some(term) = terms.iter().find(|t| t.contains(['\n', '\r'])) {
        return Err(ExtractionError::MalformedResponse {
            reason: format!("line break inside term {:?}", term),
        });
    }

    if !(MIN_KEYWORDS..=MAX_KEYWORDS).contains(&terms.len()) {
        return Err(ExtractionError::MalformedResponse {
            reason: format!(
                "expected {}-{} terms, got {}",
                MIN_KEYWORDS,
                MAX_KEYWORDS,
                terms.len()
            ),
        });
    }

    if let Some(term) = terms.iter().find(|t| t.chars().count() > MAX_KEYWORD_CHARS) {
        return Err(ExtractionError::MalformedResponse {
            reason: format!(
                "term exceeds {} characters: {:?}",
                MAX_KEYWORD_CHARS, term
            ),
        });
    }

    if !REQUESTED_KEYWORDS.contains(&terms.len()) {
        debug!(count = terms.len(), "Keyword count outside requested range");
    }

    Ok(KeywordSet::Keywords(terms))
}

/// Runs the keyword prompt through a [`ReasoningService`].
pub struct KeywordExtractor {
    reasoner: Arc<dyn ReasoningService>,
    min_categories: usize,
}

impl std::fmt::Debug for KeywordExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordExtractor")
            .field("min_categories", &self.min_categories)
            .finish_non_exhaustive()
    }
}

impl KeywordExtractor {
    pub fn new(reasoner: Arc<dyn ReasoningService>) -> Self {
        Self::with_min_categories(reasoner, DEFAULT_MIN_KEYWORD_CATEGORIES)
    }

    pub fn with_min_categories(reasoner: Arc<dyn ReasoningService>, min_categories: usize) -> Self {
        Self {
            reasoner,
            min_categories,
        }
    }

    pub fn prompt(&self, project_text: &str) -> String {
        let min_categories = self.min_categories.to_string();
        render(
            KEYWORD_TEMPLATE,
            &[
                ("min_categories", min_categories.as_str()),
                ("project_text", project_text),
            ],
        )
    }

    /// One reasoning call, no retry.
    #[instrument(skip(self, project_text), fields(text_len = project_text.len()))]
    pub async fn extract(&self, project_text: &str) -> Result<KeywordSet, ExtractionError> {
        let request = ReasoningRequest::text(self.prompt(project_text), KEYWORD_TEMPERATURE);
        let response = self.reasoner.complete(request).await?;

        let keywords = parse_keywords(&response)?;
        match &keywords {
            KeywordSet::Insufficient => info!("Project text judged insufficient"),
            KeywordSet::Keywords(k) => info!(keywords = ?k, "Extracted keywords"),
        }
        Ok(keywords)
    }
}
