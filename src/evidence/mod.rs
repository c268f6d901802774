//! Evidence resolution: knowledge cache first, live search + scrape as fallback.
//!
//! The cache is consulted with a query built from the keywords. When it returns fewer
//! than `min_cache_hits` snippets, the same query goes to the search service; each hit's
//! page is scraped and the scraped text replaces the search snippet (hits that fail to
//! scrape are dropped). A non-empty fallback block is written back to the cache.

mod error;

#[cfg(test)]
mod tests;

pub use error::ResolutionError;

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::constants::{
    DEFAULT_CACHE_TOP_K, DEFAULT_MAX_SEARCH_RESULTS, DEFAULT_MIN_CACHE_HITS, DEFAULT_SCRAPE_DELAY,
    EVIDENCE_QUERY_PREFIX, SEARCH_SNIPPET_SOURCE,
};
use crate::knowledge::{KnowledgeStore, SnippetMetadata};
use crate::scrape::PageScraper;
use crate::search::{SearchHit, SearchService};

/// Separator between cached snippets in an evidence block.
const CACHE_SNIPPET_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Snippets requested from the cache.
    pub cache_top_k: usize,
    /// Cache hits at or above which no search runs.
    pub min_cache_hits: usize,
    /// Search results requested on fallback.
    pub max_search_results: usize,
    /// Pause between successive scrapes.
    pub scrape_delay: Duration,
    /// Text placed before the keywords in every query.
    pub query_prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_top_k: DEFAULT_CACHE_TOP_K,
            min_cache_hits: DEFAULT_MIN_CACHE_HITS,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            scrape_delay: DEFAULT_SCRAPE_DELAY,
            query_prefix: EVIDENCE_QUERY_PREFIX.to_string(),
        }
    }
}

/// Where an evidence block came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceOrigin {
    /// Joined knowledge-cache snippets.
    Cache,
    /// Scraped search results (also written back to the cache).
    Search,
    /// Nothing usable was found.
    Empty,
}

/// Grounding text for the scoring call. Built per invocation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceBlock {
    pub text: String,
    pub origin: EvidenceOrigin,
}

impl EvidenceBlock {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            origin: EvidenceOrigin::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// `"<prefix> <k1>, <k2>, ..."`. Identical keyword lists always give identical queries.
pub fn build_query(prefix: &str, keywords: &[String]) -> String {
    format!("{} {}", prefix, keywords.join(", "))
}

/// One `- <title>: <snippet>` line per hit.
pub fn format_search_results(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("- {}: {}", hit.title, hit.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct EvidenceResolver {
    knowledge: Arc<dyn KnowledgeStore>,
    search: Arc<dyn SearchService>,
    scraper: Arc<dyn PageScraper>,
    config: ResolverConfig,
}

impl std::fmt::Debug for EvidenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvidenceResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EvidenceResolver {
    pub fn new(
        knowledge: Arc<dyn KnowledgeStore>,
        search: Arc<dyn SearchService>,
        scraper: Arc<dyn PageScraper>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            knowledge,
            search,
            scraper,
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn query_for(&self, keywords: &[String]) -> String {
        build_query(&self.config.query_prefix, keywords)
    }

    #[instrument(skip(self, keywords), fields(keywords = keywords.len()))]
    pub async fn resolve(&self, keywords: &[String]) -> Result<EvidenceBlock, ResolutionError> {
        let query = self.query_for(keywords);

        let cached = self
            .knowledge
            .query(&query, self.config.cache_top_k)
            .await?;
        debug!(hits = cached.len(), "Knowledge cache consulted");

        if cached.len() >= self.config.min_cache_hits {
            info!(snippets = cached.len(), "Evidence served from knowledge cache");
            return Ok(EvidenceBlock {
                text: cached.join(CACHE_SNIPPET_SEPARATOR),
                origin: EvidenceOrigin::Cache,
            });
        }

        let hits = self
            .search
            .search(&query, self.config.max_search_results)
            .await?;
        let scraped = self.scrape_hits(hits).await;
        let block = format_search_results(&scraped);

        if block.is_empty() {
            info!("No evidence found in cache or search");
            return Ok(EvidenceBlock::empty());
        }

        let metadata = [SnippetMetadata::new(SEARCH_SNIPPET_SOURCE, query.as_str())];
        self.knowledge
            .add(std::slice::from_ref(&block), Some(&metadata))
            .await?;

        info!(
            sources = scraped.len(),
            chars = block.len(),
            "Evidence served from live search; cache backfilled"
        );
        Ok(EvidenceBlock {
            text: block,
            origin: EvidenceOrigin::Search,
        })
    }

    /// Scrapes each hit in order, keeping those that yield text.
    async fn scrape_hits(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        let mut kept = Vec::with_capacity(hits.len());

        for (i, mut hit) in hits.into_iter().enumerate() {
            if i > 0 && !self.config.scrape_delay.is_zero() {
                tokio::time::sleep(self.config.scrape_delay).await;
            }

            match self.scraper.scrape(&hit.link).await {
                Some(text) => {
                    hit.snippet = text;
                    kept.push(hit);
                }
                None => debug!(link = %hit.link, "Dropping unscrapeable source"),
            }
        }

        kept
    }
}
