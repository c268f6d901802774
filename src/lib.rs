//! Wildscore library crate (used by the CLI binary and integration tests).
//!
//! Scores wildlife conservation project proposals against recent evidence. A
//! reasoning model extracts search keywords from the proposal, evidence is pulled
//! from a persistent knowledge cache (or live web search plus scraping on a miss),
//! and a second reasoning call grades the proposal on five capped categories.
//!
//! # Public API Surface
//!
//! ## Entry Points
//! - [`Pipeline`], [`run_pipeline`] - End-to-end scoring
//! - [`ProjectChat`] - Question answering over the knowledge cache
//! - [`Config`], [`ConfigError`] - Environment-backed configuration
//!
//! ## Results & Errors
//! - [`ScoreResult`], [`ScoreCard`], [`ScoreBreakdown`], [`Category`] - Scoring output
//! - [`PipelineError`] - Fatal failures (everything else is a defined result)
//!
//! ## Capabilities
//! - [`ReasoningService`] / [`GenaiReasoner`] - Chat completions
//! - [`SearchService`] / [`GoogleSearch`] - Web search
//! - [`PageScraper`] / [`WebScraper`] - Page and document text
//! - [`KnowledgeStore`] / [`DiskKnowledgeCache`] - Persistent evidence snippets
//! - [`Embedder`] - Text embeddings for the knowledge cache
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod chat;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod error;
pub mod evidence;
pub mod hashing;
pub mod keywords;
pub mod knowledge;
pub mod pipeline;
pub mod prompts;
pub mod reasoning;
pub mod scoring;
pub mod scrape;
pub mod search;
pub mod text;

pub use chat::ProjectChat;
pub use config::{Config, ConfigError};
pub use embedding::{Embedder, EmbeddingError, HttpEmbedder, MemoEmbedder, StubEmbedder};
pub use error::PipelineError;
pub use evidence::{EvidenceBlock, EvidenceOrigin, EvidenceResolver, ResolutionError, ResolverConfig};
pub use hashing::{hash_text, hash_to_u64};
pub use keywords::{ExtractionError, KeywordExtractor, KeywordSet, parse_keywords};
pub use knowledge::{
    DiskKnowledgeCache, EvidenceSnippet, KnowledgeConfig, KnowledgeError, KnowledgeStats,
    KnowledgeStore, SnippetMetadata,
};
pub use pipeline::{Pipeline, Services, run_pipeline};
pub use reasoning::{GenaiReasoner, ReasoningError, ReasoningRequest, ReasoningService};
pub use scoring::{
    Category, ScoreBreakdown, ScoreCard, ScoreFormatError, ScoreResult, Scorer, ScoringError,
};
pub use scrape::{PageScraper, ScrapeError, WebScraper};
pub use search::{DisabledSearch, GoogleSearch, SearchError, SearchHit, SearchService};

#[cfg(any(test, feature = "mock"))]
pub use knowledge::MockKnowledgeStore;
#[cfg(any(test, feature = "mock"))]
pub use reasoning::MockReasoner;
#[cfg(any(test, feature = "mock"))]
pub use scrape::MockScraper;
#[cfg(any(test, feature = "mock"))]
pub use search::MockSearch;
