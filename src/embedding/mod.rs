//! Embedding generation.
//!
//! - [`HttpEmbedder`] calls an OpenAI-compatible `/embeddings` endpoint.
//! - [`StubEmbedder`] is deterministic and offline (tests, no API key).
//! - [`MemoEmbedder`] wraps either one with an in-memory memo keyed by text hash.

mod error;
/// OpenAI-compatible HTTP embedder.
pub mod http;
/// In-memory memo wrapper.
pub mod memo;
/// Feature-hashing embedder.
pub mod stub;
/// Vector math and byte conversion helpers.
pub mod utils;

use async_trait::async_trait;

pub use error::EmbeddingError;
pub use http::HttpEmbedder;
pub use memo::MemoEmbedder;
pub use stub::StubEmbedder;

/// Turns text into a fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds several texts, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Output dimension.
    fn dimension(&self) -> usize;

    /// Whether this embedder is the offline stub.
    fn is_stub(&self) -> bool {
        false
    }
}
