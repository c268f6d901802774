//! Embedding memo (in-memory, keyed by BLAKE3 of the text).
//!
//! Query strings built from the same keyword set repeat often; the memo saves one
//! embedding round-trip for each repeat.

use std::sync::Arc;

use async_trait::async_trait;
use moka::sync::Cache;
use tracing::debug;

use super::Embedder;
use super::error::EmbeddingError;
use crate::constants::EMBEDDING_MEMO_CAPACITY;
use crate::hashing::hash_text;

pub struct MemoEmbedder {
    inner: Arc<dyn Embedder>,
    entries: Cache<[u8; 32], Arc<Vec<f32>>>,
}

impl MemoEmbedder {
    /// Wraps `inner` with the default memo capacity.
    pub fn new(inner: Arc<dyn Embedder>) -> Self {
        Self::with_capacity(inner, EMBEDDING_MEMO_CAPACITY)
    }

    /// Wraps `inner` with a max entry capacity (LRU eviction).
    pub fn with_capacity(inner: Arc<dyn Embedder>, capacity: u64) -> Self {
        Self {
            inner,
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Approximate number of memoized embeddings.
    pub fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl std::fmt::Debug for MemoEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoEmbedder")
            .field("dimension", &self.inner.dimension())
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

#[async_trait]
impl Embedder for MemoEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let key = hash_text(text);
        if let Some(hit) = self.entries.get(&key) {
            debug!(text_len = text.len(), "Embedding memo hit");
            return Ok(hit.as_ref().clone());
        }

        let embedding = self.inner.embed(text).await?;
        self.entries.insert(key, Arc::new(embedding.clone()));
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let keys: Vec<[u8; 32]> = texts.iter().map(|t| hash_text(t)).collect();
        let mut out: Vec<Option<Vec<f32>>> = keys
            .iter()
            .map(|k| self.entries.get(k).map(|v| v.as_ref().clone()))
            .collect();

        let missing: Vec<usize> = out
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.is_none().then_some(i))
            .collect();

        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fresh = self.inner.embed_batch(&batch).await?;
            if fresh.len() != batch.len() {
                return Err(EmbeddingError::MalformedResponse {
                    reason: format!("expected {} embeddings, got {}", batch.len(), fresh.len()),
                });
            }
            for (&i, embedding) in missing.iter().zip(fresh) {
                self.entries.insert(keys[i], Arc::new(embedding.clone()));
                out[i] = Some(embedding);
            }
        }

        debug!(
            total = texts.len(),
            misses = missing.len(),
            "Embedded batch through memo"
        );

        Ok(out.into_iter().flatten().collect())
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn is_stub(&self) -> bool {
        self.inner.is_stub()
    }
}
