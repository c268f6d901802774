//! Cross-cutting, shared constants.
//!
//! Pipeline limits live here so the normalizer, scraper, resolver and config
//! defaults cannot drift apart.

use std::time::Duration;

/// Words kept from a project description before any reasoning call.
pub const MAX_PROJECT_WORDS: usize = 400;

/// Words kept from a scraped document (PDF branch).
pub const MAX_SCRAPE_WORDS: usize = 500;

/// Per-request timeout for page scraping.
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

/// Politeness delay between successive scrape calls in one batch.
pub const DEFAULT_SCRAPE_DELAY: Duration = Duration::from_millis(100);

/// Browser-like identification sent with every scrape request.
pub const SCRAPER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Snippets requested from the knowledge cache per resolution.
pub const DEFAULT_CACHE_TOP_K: usize = 3;

/// Minimum cache hits that make a live search unnecessary.
pub const DEFAULT_MIN_CACHE_HITS: usize = 2;

/// Results requested from the search service on fallback.
pub const DEFAULT_MAX_SEARCH_RESULTS: usize = 3;

/// Upper bound accepted by the Custom Search JSON API for `num`.
pub const MAX_SEARCH_RESULTS_LIMIT: usize = 10;

/// Prefix for every evidence query built from keywords.
pub const EVIDENCE_QUERY_PREFIX: &str = "wildlife conservation recent data";

/// Keyword categories the extractor weighs (species, technique, location, challenge).
pub const KEYWORD_CATEGORY_COUNT: usize = 4;

/// Default number of keyword categories that must be covered.
pub const DEFAULT_MIN_KEYWORD_CATEGORIES: usize = 2;

/// Sentinel emitted by the extractor when the text lacks signal.
pub const INSUFFICIENT_SENTINEL: &str = "insufficient";

/// Fewest keywords accepted from a non-sentinel response.
pub const MIN_KEYWORDS: usize = 2;

/// Most keywords accepted before the response is treated as malformed.
pub const MAX_KEYWORDS: usize = 12;

/// Longest single keyword accepted.
pub const MAX_KEYWORD_CHARS: usize = 80;

/// Error string of the scoring format-error envelope.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse response";

/// Upper bound of `final_score`.
pub const MAX_FINAL_SCORE: u32 = 100;

/// Default embedding dimension (matches `text-embedding-3-small`).
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Source label for snippets added without metadata.
pub const DEFAULT_SNIPPET_SOURCE: &str = "cached";

/// Source label for snippets backfilled from a live search.
pub const SEARCH_SNIPPET_SOURCE: &str = "search";

/// Default reasoning model.
pub const DEFAULT_REASONING_MODEL: &str = "gpt-4o-mini";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default OpenAI-compatible embeddings base URL.
pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1";

/// Default Custom Search JSON API endpoint.
pub const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Temperature used for keyword extraction.
pub const KEYWORD_TEMPERATURE: f64 = 0.2;

/// Temperature used for project chat.
pub const CHAT_TEMPERATURE: f64 = 0.2;

/// Temperature used for scoring.
pub const SCORING_TEMPERATURE: f64 = 0.0;

/// Capacity of the in-memory embedding memo.
pub const EMBEDDING_MEMO_CAPACITY: u64 = 1_024;
