use async_trait::async_trait;
use parking_lot::Mutex;

use super::{SearchError, SearchHit, SearchService};

/// Canned [`SearchService`] that records each query.
#[derive(Default)]
pub struct MockSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    queries: Mutex<Vec<(String, usize)>>,
}

impl MockSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    /// Every search fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().len()
    }
}

#[async_trait]
impl SearchService for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        self.queries.lock().push((query.to_string(), max_results));

        if self.fail {
            return Err(SearchError::RequestFailed {
                reason: "mock search failure".to_string(),
            });
        }

        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}
