//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `WILDSCORE_*` environment variables;
//! provider credentials use their conventional names (`OPENAI_API_KEY`,
//! `GOOGLE_API_KEY`, `GOOGLE_CSE_ID`).

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CACHE_TOP_K, DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL,
    DEFAULT_MAX_SEARCH_RESULTS, DEFAULT_MIN_CACHE_HITS, DEFAULT_MIN_KEYWORD_CATEGORIES,
    DEFAULT_REASONING_MODEL, DEFAULT_SCRAPE_DELAY, DEFAULT_SCRAPE_TIMEOUT, DEFAULT_SEARCH_URL,
    EVIDENCE_QUERY_PREFIX, KEYWORD_CATEGORY_COUNT, MAX_SEARCH_RESULTS_LIMIT,
};
use crate::evidence::ResolverConfig;
use crate::knowledge::KnowledgeConfig;

/// Pipeline configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read overrides on top of defaults.
#[derive(Clone)]
pub struct Config {
    /// Directory holding the knowledge cache. Default: `./.data/knowledge`.
    pub cache_path: PathBuf,

    /// Capacity of the knowledge cache (LRU eviction). Default: unbounded.
    pub cache_max_entries: Option<usize>,

    /// Snippet time-to-live. Default: never expires.
    pub cache_ttl: Option<Duration>,

    /// Cosine similarity a cached snippet needs to count as a hit. Default: none.
    pub cache_min_similarity: Option<f32>,

    /// Model used for keyword extraction, scoring and chat.
    pub reasoning_model: String,

    /// Embedding model name sent to the embeddings endpoint.
    pub embedding_model: String,

    /// OpenAI-compatible embeddings base URL.
    pub embedding_url: String,

    /// Dimension of stored embeddings.
    pub embedding_dim: usize,

    /// Use the deterministic offline embedder instead of the HTTP one.
    pub stub_embedder: bool,

    /// Snippets requested from the cache per resolution. Default: `3`.
    pub cache_top_k: usize,

    /// Cache hits below which the live search fallback runs. Default: `2`.
    pub min_cache_hits: usize,

    /// Search results requested on fallback. Default: `3`.
    pub max_search_results: usize,

    /// Categories (of four) the keyword extractor requires. Default: `2`.
    pub min_keyword_categories: usize,

    /// Timeout for each scrape request. Default: 10s.
    pub scrape_timeout: Duration,

    /// Delay between scrape calls in one batch. Default: 100ms.
    pub scrape_delay: Duration,

    /// Custom Search JSON API endpoint.
    pub search_url: String,

    /// Embeddings API key.
    pub openai_api_key: Option<String>,

    /// Custom Search API key.
    pub google_api_key: Option<String>,

    /// Programmable Search Engine id.
    pub google_cse_id: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("cache_path", &self.cache_path)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache_min_similarity", &self.cache_min_similarity)
            .field("reasoning_model", &self.reasoning_model)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_url", &self.embedding_url)
            .field("embedding_dim", &self.embedding_dim)
            .field("stub_embedder", &self.stub_embedder)
            .field("cache_top_k", &self.cache_top_k)
            .field("min_cache_hits", &self.min_cache_hits)
            .field("max_search_results", &self.max_search_results)
            .field("min_keyword_categories", &self.min_keyword_categories)
            .field("scrape_timeout", &self.scrape_timeout)
            .field("scrape_delay", &self.scrape_delay)
            .field("search_url", &self.search_url)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "<redacted>"))
            .field("google_cse_id", &self.google_cse_id)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("./.data/knowledge"),
            cache_max_entries: None,
            cache_ttl: None,
            cache_min_similarity: None,
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_url: DEFAULT_EMBEDDING_URL.to_string(),
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            stub_embedder: false,
            cache_top_k: DEFAULT_CACHE_TOP_K,
            min_cache_hits: DEFAULT_MIN_CACHE_HITS,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            min_keyword_categories: DEFAULT_MIN_KEYWORD_CATEGORIES,
            scrape_timeout: DEFAULT_SCRAPE_TIMEOUT,
            scrape_delay: DEFAULT_SCRAPE_DELAY,
            search_url: DEFAULT_SEARCH_URL.to_string(),
            openai_api_key: None,
            google_api_key: None,
            google_cse_id: None,
        }
    }
}

impl Config {
    const ENV_CACHE_PATH: &'static str = "WILDSCORE_CACHE_PATH";
    const ENV_CACHE_MAX_ENTRIES: &'static str = "WILDSCORE_CACHE_MAX_ENTRIES";
    const ENV_CACHE_TTL_SECS: &'static str = "WILDSCORE_CACHE_TTL_SECS";
    const ENV_CACHE_MIN_SIMILARITY: &'static str = "WILDSCORE_CACHE_MIN_SIMILARITY";
    const ENV_REASONING_MODEL: &'static str = "WILDSCORE_REASONING_MODEL";
    const ENV_EMBEDDING_MODEL: &'static str = "WILDSCORE_EMBEDDING_MODEL";
    const ENV_EMBEDDING_URL: &'static str = "WILDSCORE_EMBEDDING_URL";
    const ENV_EMBEDDING_DIM: &'static str = "WILDSCORE_EMBEDDING_DIM";
    const ENV_STUB_EMBEDDER: &'static str = "WILDSCORE_STUB_EMBEDDER";
    const ENV_CACHE_TOP_K: &'static str = "WILDSCORE_CACHE_TOP_K";
    const ENV_MIN_CACHE_HITS: &'static str = "WILDSCORE_MIN_CACHE_HITS";
    const ENV_MAX_SEARCH_RESULTS: &'static str = "WILDSCORE_MAX_SEARCH_RESULTS";
    const ENV_MIN_KEYWORD_CATEGORIES: &'static str = "WILDSCORE_MIN_KEYWORD_CATEGORIES";
    const ENV_SCRAPE_TIMEOUT_SECS: &'static str = "WILDSCORE_SCRAPE_TIMEOUT_SECS";
    const ENV_SCRAPE_DELAY_MS: &'static str = "WILDSCORE_SCRAPE_DELAY_MS";
    const ENV_SEARCH_URL: &'static str = "WILDSCORE_SEARCH_URL";
    const ENV_OPENAI_API_KEY: &'static str = "OPENAI_API_KEY";
    const ENV_GOOGLE_API_KEY: &'static str = "GOOGLE_API_KEY";
    const ENV_GOOGLE_CSE_ID: &'static str = "GOOGLE_CSE_ID";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let openai_api_key = Self::parse_optional_string_from_env(Self::ENV_OPENAI_API_KEY);
        let stub_embedder = Self::parse_flag_from_env(Self::ENV_STUB_EMBEDDER, false)?
            || openai_api_key.is_none();

        Ok(Self {
            cache_path: Self::parse_path_from_env(Self::ENV_CACHE_PATH, defaults.cache_path),
            cache_max_entries: Self::parse_optional_usize_from_env(Self::ENV_CACHE_MAX_ENTRIES)?,
            cache_ttl: Self::parse_optional_usize_from_env(Self::ENV_CACHE_TTL_SECS)?
                .map(|secs| Duration::from_secs(secs as u64)),
            cache_min_similarity: Self::parse_optional_f32_from_env(
                Self::ENV_CACHE_MIN_SIMILARITY,
            )?,
            reasoning_model: Self::parse_string_from_env(
                Self::ENV_REASONING_MODEL,
                defaults.reasoning_model,
            ),
            embedding_model: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_MODEL,
                defaults.embedding_model,
            ),
            embedding_url: Self::parse_string_from_env(
                Self::ENV_EMBEDDING_URL,
                defaults.embedding_url,
            ),
            embedding_dim: Self::parse_usize_from_env(
                Self::ENV_EMBEDDING_DIM,
                defaults.embedding_dim,
            )?,
            stub_embedder,
            cache_top_k: Self::parse_usize_from_env(Self::ENV_CACHE_TOP_K, defaults.cache_top_k)?,
            min_cache_hits: Self::parse_usize_from_env(
                Self::ENV_MIN_CACHE_HITS,
                defaults.min_cache_hits,
            )?,
            max_search_results: Self::parse_usize_from_env(
                Self::ENV_MAX_SEARCH_RESULTS,
                defaults.max_search_results,
            )?,
            min_keyword_categories: Self::parse_usize_from_env(
                Self::ENV_MIN_KEYWORD_CATEGORIES,
                defaults.min_keyword_categories,
            )?,
            scrape_timeout: Self::parse_optional_usize_from_env(Self::ENV_SCRAPE_TIMEOUT_SECS)?
                .map(|secs| Duration::from_secs(secs as u64))
                .unwrap_or(defaults.scrape_timeout),
            scrape_delay: Self::parse_optional_usize_from_env(Self::ENV_SCRAPE_DELAY_MS)?
                .map(|ms| Duration::from_millis(ms as u64))
                .unwrap_or(defaults.scrape_delay),
            search_url: Self::parse_string_from_env(Self::ENV_SEARCH_URL, defaults.search_url),
            openai_api_key,
            google_api_key: Self::parse_optional_string_from_env(Self::ENV_GOOGLE_API_KEY),
            google_cse_id: Self::parse_optional_string_from_env(Self::ENV_GOOGLE_CSE_ID),
        })
    }

    /// Validates ranges and paths (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_path.exists() && !self.cache_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.cache_path.clone(),
            });
        }

        if self.cache_top_k == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CACHE_TOP_K,
                reason: "must be at least 1".to_string(),
            });
        }

        if self.min_cache_hits == 0 || self.min_cache_hits > self.cache_top_k {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MIN_CACHE_HITS,
                reason: format!(
                    "must be between 1 and cache_top_k ({}), got {}",
                    self.cache_top_k, self.min_cache_hits
                ),
            });
        }

        if !(1..=MAX_SEARCH_RESULTS_LIMIT).contains(&self.max_search_results) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MAX_SEARCH_RESULTS,
                reason: format!(
                    "must be between 1 and {}, got {}",
                    MAX_SEARCH_RESULTS_LIMIT, self.max_search_results
                ),
            });
        }

        if !(1..=KEYWORD_CATEGORY_COUNT).contains(&self.min_keyword_categories) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_MIN_KEYWORD_CATEGORIES,
                reason: format!(
                    "must be between 1 and {}, got {}",
                    KEYWORD_CATEGORY_COUNT, self.min_keyword_categories
                ),
            });
        }

        if self.embedding_dim == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_EMBEDDING_DIM,
                reason: "must be at least 1".to_string(),
            });
        }

        if let Some(floor) = self.cache_min_similarity
            && !(-1.0..=1.0).contains(&floor)
        {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CACHE_MIN_SIMILARITY,
                reason: format!("must be between -1 and 1, got {}", floor),
            });
        }

        if self.cache_max_entries == Some(0) {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_CACHE_MAX_ENTRIES,
                reason: "must be at least 1 when set".to_string(),
            });
        }

        Ok(())
    }

    /// Returns the search credentials, or the first missing variable.
    pub fn search_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let key = self
            .google_api_key
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_GOOGLE_API_KEY,
            })?;
        let cx = self
            .google_cse_id
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_GOOGLE_CSE_ID,
            })?;
        Ok((key, cx))
    }

    /// Evidence resolver settings derived from this config.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            cache_top_k: self.cache_top_k,
            min_cache_hits: self.min_cache_hits,
            max_search_results: self.max_search_results,
            scrape_delay: self.scrape_delay,
            query_prefix: EVIDENCE_QUERY_PREFIX.to_string(),
        }
    }

    /// Knowledge cache settings derived from this config.
    pub fn knowledge_config(&self) -> KnowledgeConfig {
        KnowledgeConfig {
            path: self.cache_path.clone(),
            max_entries: self.cache_max_entries,
            ttl: self.cache_ttl,
            min_similarity: self.cache_min_similarity,
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        Self::parse_optional_string_from_env(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_usize_from_env(name: &'static str, default: usize) -> Result<usize, ConfigError> {
        Ok(Self::parse_optional_usize_from_env(name)?.unwrap_or(default))
    }

    fn parse_optional_usize_from_env(name: &'static str) -> Result<Option<usize>, ConfigError> {
        match Self::parse_optional_string_from_env(name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::InvalidNumber {
                    name,
                    value,
                    source: e,
                }),
            None => Ok(None),
        }
    }

    fn parse_optional_f32_from_env(name: &'static str) -> Result<Option<f32>, ConfigError> {
        match Self::parse_optional_string_from_env(name) {
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e| ConfigError::InvalidDecimal {
                    name,
                    value,
                    source: e,
                }),
            None => Ok(None),
        }
    }

    fn parse_flag_from_env(name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match Self::parse_optional_string_from_env(name) {
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidFlag { name, value }),
            },
            None => Ok(default),
        }
    }
}
