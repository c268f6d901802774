use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Error, Debug)]
/// Errors returned by the knowledge cache.
pub enum KnowledgeError {
    /// IO error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Embedding generation failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Cache directory is missing/unavailable.
    #[error("knowledge cache path unavailable: {path}")]
    StorageUnavailable {
        /// Path that was unavailable.
        path: PathBuf,
    },

    /// `add` received metadata for a different number of texts.
    #[error("metadata count {metadata} does not match text count {texts}")]
    MetadataMismatch {
        /// Number of texts.
        texts: usize,
        /// Number of metadata entries.
        metadata: usize,
    },

    /// A blocking storage task panicked or was cancelled.
    #[error("storage task failed: {reason}")]
    TaskFailed {
        /// Error message.
        reason: String,
    },
}

impl From<tokio::task::JoinError> for KnowledgeError {
    fn from(err: tokio::task::JoinError) -> Self {
        KnowledgeError::TaskFailed {
            reason: err.to_string(),
        }
    }
}

/// Convenience result type for knowledge cache operations.
pub type KnowledgeResult<T> = Result<T, KnowledgeError>;
