use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{KnowledgeError, KnowledgeResult};
use super::{EvidenceSnippet, KnowledgeStore, SnippetMetadata};

/// In-memory [`KnowledgeStore`] that records every call.
///
/// Queries return stored snippets in insertion order (no similarity ranking), which
/// keeps pipeline tests independent of embeddings.
#[derive(Default)]
pub struct MockKnowledgeStore {
    snippets: Mutex<Vec<(EvidenceSnippet, SnippetMetadata)>>,
    queries: Mutex<Vec<(String, usize)>>,
    adds: Mutex<Vec<Vec<String>>>,
    fail_add: bool,
}

impl MockKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated with `texts` (source `"cached"`).
    pub fn with_snippets<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::default();
        {
            let mut snippets = store.snippets.lock();
            for text in texts {
                let meta = SnippetMetadata::default();
                snippets.push((
                    EvidenceSnippet {
                        text: text.into(),
                        source: meta.source.clone(),
                    },
                    meta,
                ));
            }
        }
        store
    }

    /// Every `add` call fails with an I/O error.
    pub fn failing_add(mut self) -> Self {
        self.fail_add = true;
        self
    }

    pub fn len(&self) -> usize {
        self.snippets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(text, k)` for every query, in call order.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }

    /// Texts passed to each `add` call, in call order.
    pub fn added(&self) -> Vec<Vec<String>> {
        self.adds.lock().clone()
    }

    /// Metadata stored alongside each snippet.
    pub fn metadata(&self) -> Vec<SnippetMetadata> {
        self.snippets.lock().iter().map(|(_, m)| m.clone()).collect()
    }
}

#[async_trait]
impl KnowledgeStore for MockKnowledgeStore {
    async fn query_snippets(
        &self,
        text: &str,
        k: usize,
    ) -> KnowledgeResult<Vec<EvidenceSnippet>> {
        self.queries.lock().push((text.to_string(), k));
        Ok(self
            .snippets
            .lock()
            .iter()
            .take(k)
            .map(|(s, _)| s.clone())
            .collect())
    }

    async fn add(
        &self,
        texts: &[String],
        metadata: Option<&[SnippetMetadata]>,
    ) -> KnowledgeResult<()> {
        self.adds.lock().push(texts.to_vec());

        if self.fail_add {
            return Err(KnowledgeError::Io(std::io::Error::other(
                "mock add failure",
            )));
        }

        if let Some(metadata) = metadata
            && metadata.len() != texts.len()
        {
            return Err(KnowledgeError::MetadataMismatch {
                texts: texts.len(),
                metadata: metadata.len(),
            });
        }

        let mut snippets = self.snippets.lock();
        for (i, text) in texts.iter().enumerate() {
            let meta = metadata
                .and_then(|m| m.get(i).cloned())
                .unwrap_or_default();
            snippets.push((
                EvidenceSnippet {
                    text: text.clone(),
                    source: meta.source.clone(),
                },
                meta,
            ));
        }
        Ok(())
    }
}
