//! Web search capability.
//!
//! [`GoogleSearch`] talks to the Custom Search JSON API; [`MockSearch`] returns canned hits.

mod error;
mod google;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use error::SearchError;
pub use google::GoogleSearch;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockSearch;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

#[async_trait]
pub trait SearchService: Send + Sync {
    /// Up to `max_results` hits for `query`, best first.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;
}

/// Stand-in used when search credentials are absent: every call fails.
///
/// Lets cache-only setups run until a fallback is actually needed.
#[derive(Debug, Clone)]
pub struct DisabledSearch {
    reason: String,
}

impl DisabledSearch {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl SearchService for DisabledSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        Err(SearchError::NotConfigured {
            reason: self.reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_search_always_fails() {
        let search = DisabledSearch::new("GOOGLE_API_KEY is not set");
        let err = search.search("q", 3).await.unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[tokio::test]
    async fn test_mock_search_truncates_and_records() {
        let search = MockSearch::new(vec![
            SearchHit::new("a", "l1", "s1"),
            SearchHit::new("b", "l2", "s2"),
        ]);

        let hits = search.search("tigers", 1).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(search.queries(), vec![("tigers".to_string(), 1)]);
        assert!(MockSearch::failing().search("q", 1).await.is_err());
    }
}
