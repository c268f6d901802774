use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{SearchError, SearchHit, SearchService};
use crate::constants::{DEFAULT_SEARCH_URL, MAX_SEARCH_RESULTS_LIMIT};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    // Absent when the query has no results.
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
}

/// Google Programmable Search (Custom Search JSON API) client.
#[derive(Clone)]
pub struct GoogleSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

impl std::fmt::Debug for GoogleSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSearch")
            .field("endpoint", &self.endpoint)
            .field("engine_id", &self.engine_id)
            .finish_non_exhaustive()
    }
}

impl GoogleSearch {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_SEARCH_URL, api_key, engine_id)
    }

    pub fn with_endpoint(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        engine_id: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }
}

#[async_trait]
impl SearchService for GoogleSearch {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        let num = max_results.min(MAX_SEARCH_RESULTS_LIMIT).to_string();

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| SearchError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        let hits: Vec<SearchHit> = parsed
            .items
            .into_iter()
            .take(max_results)
            .map(|item| SearchHit {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect();

        debug!(hits = hits.len(), "Search completed");
        Ok(hits)
    }
}
