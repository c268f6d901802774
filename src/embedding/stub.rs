//! Deterministic offline embedder.
//!
//! Signed feature hashing over lower-cased word tokens: texts that share words land
//! near each other, so similarity search behaves sensibly without a model or network.

use async_trait::async_trait;
use tracing::debug;

use crate::hashing::hash_token;

use super::Embedder;
use super::error::EmbeddingError;
use super::utils::l2_normalize;

const BUCKET_SALT: u8 = 0;
const SIGN_SALT: u8 = 1;
const MIN_TOKEN_CHARS: usize = 2;

#[derive(Debug, Clone)]
pub struct StubEmbedder {
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Result<Self, EmbeddingError> {
        if dimension == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "stub embedder dimension must be > 0".to_string(),
            });
        }
        Ok(Self { dimension })
    }

    /// Synchronous embedding (the trait method wraps this).
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimension];
        let mut tokens = 0usize;

        for token in tokenize(text) {
            let bucket = (hash_token(&token, BUCKET_SALT) % self.dimension as u64) as usize;
            let sign = if hash_token(&token, SIGN_SALT) & 1 == 0 {
                1.0
            } else {
                -1.0
            };
            embedding[bucket] += sign;
            tokens += 1;
        }

        debug!(text_len = text.len(), tokens, "Generated stub embedding");

        l2_normalize(&mut embedding);
        embedding
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(|t| t.to_lowercase())
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_sync(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn is_stub(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::utils::cosine_similarity;

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(StubEmbedder::new(0).is_err());
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = StubEmbedder::new(256).unwrap();
        let a = embedder.embed_sync("Tiger conservation in the Sundarbans");
        let b = embedder.embed_sync("Tiger conservation in the Sundarbans");

        assert_eq!(a, b);
        assert_eq!(a.len(), 256);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let embedder = StubEmbedder::new(128).unwrap();
        let a = embedder.embed_sync("Coral reef restoration");
        let b = embedder.embed_sync("coral, REEF; restoration!");
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_shared_words_rank_closer() {
        let embedder = StubEmbedder::new(1536).unwrap();
        let query = embedder.embed_sync("tiger conservation in Sundarbans");
        let related =
            embedder.embed_sync("The Bengal Tiger Conservation Project in Sundarbans focuses on anti-poaching");
        let unrelated = embedder.embed_sync("Great Barrier Reef coral gardening and water quality");

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_empty_text_yields_zero_vector() {
        let embedder = StubEmbedder::new(16).unwrap();
        let v = embedder.embed_sync("  . ");
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_trait_embed_matches_sync() {
        let embedder = StubEmbedder::new(64).unwrap();
        let via_trait = embedder.embed("snow leopard").await.unwrap();
        assert_eq!(via_trait, embedder.embed_sync("snow leopard"));
        assert!(embedder.is_stub());
        assert_eq!(embedder.dimension(), 64);
    }
}
