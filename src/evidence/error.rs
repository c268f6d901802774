use thiserror::Error;

use crate::knowledge::KnowledgeError;
use crate::search::SearchError;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("knowledge cache error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),
}
