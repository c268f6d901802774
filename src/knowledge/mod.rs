//! Persistent, similarity-searchable store of evidence snippets.
//!
//! [`DiskKnowledgeCache`] keeps one `rkyv` file per snippet under a fixed directory and an
//! in-memory index for cosine search. [`KnowledgeStore`] is the seam the pipeline uses,
//! so tests can swap in [`MockKnowledgeStore`].

/// Knowledge cache error types.
pub mod error;
/// On-disk record format.
pub mod record;
mod store;

#[cfg(any(test, feature = "mock"))]
mod mock;


pub use error::{KnowledgeError, KnowledgeResult};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockKnowledgeStore;
pub use record::SnippetRecord;
pub use store::DiskKnowledgeCache;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::constants::DEFAULT_SNIPPET_SOURCE;

/// A unit of external evidence text and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSnippet {
    pub text: String,
    pub source: String,
}

/// Per-snippet metadata accepted by [`KnowledgeStore::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetMetadata {
    pub source: String,
    pub query: String,
}

impl Default for SnippetMetadata {
    fn default() -> Self {
        Self {
            source: DEFAULT_SNIPPET_SOURCE.to_string(),
            query: String::new(),
        }
    }
}

impl SnippetMetadata {
    pub fn new(source: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            query: query.into(),
        }
    }
}

/// Knowledge cache settings.
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Directory holding one file per snippet.
    pub path: PathBuf,
    /// Capacity; least-recently-used snippets are evicted beyond it.
    pub max_entries: Option<usize>,
    /// Snippets older than this are expired.
    pub ttl: Option<Duration>,
    /// Hits whose cosine similarity to the query falls below this are not returned.
    pub min_similarity: Option<f32>,
}

impl KnowledgeConfig {
    /// Unbounded, never-expiring cache at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_entries: None,
            ttl: None,
            min_similarity: None,
        }
    }
}

/// Size summary of a knowledge cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct KnowledgeStats {
    pub entries: usize,
    pub total_bytes: u64,
}

/// Similarity search and append over evidence snippets.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Up to `k` snippets nearest to `text`, nearest first.
    async fn query_snippets(&self, text: &str, k: usize)
    -> KnowledgeResult<Vec<EvidenceSnippet>>;

    /// Embeds and persists `texts`; `metadata`, when given, pairs with `texts` by index.
    async fn add(
        &self,
        texts: &[String],
        metadata: Option<&[SnippetMetadata]>,
    ) -> KnowledgeResult<()>;

    /// Up to `k` snippet texts nearest to `text`, nearest first.
    async fn query(&self, text: &str, k: usize) -> KnowledgeResult<Vec<String>> {
        Ok(self
            .query_snippets(text, k)
            .await?
            .into_iter()
            .map(|s| s.text)
            .collect())
    }
}
