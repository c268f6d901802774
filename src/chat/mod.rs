//! Question answering about a project proposal, grounded in the knowledge cache.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::constants::{CHAT_TEMPERATURE, DEFAULT_CACHE_TOP_K};
use crate::error::PipelineError;
use crate::knowledge::KnowledgeStore;
use crate::prompts::{CHAT_TEMPLATE, render};
use crate::reasoning::{ReasoningRequest, ReasoningService};

pub struct ProjectChat {
    reasoner: Arc<dyn ReasoningService>,
    knowledge: Arc<dyn KnowledgeStore>,
    top_k: usize,
}

impl std::fmt::Debug for ProjectChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectChat")
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl ProjectChat {
    pub fn new(reasoner: Arc<dyn ReasoningService>, knowledge: Arc<dyn KnowledgeStore>) -> Self {
        Self::with_top_k(reasoner, knowledge, DEFAULT_CACHE_TOP_K)
    }

    pub fn with_top_k(
        reasoner: Arc<dyn ReasoningService>,
        knowledge: Arc<dyn KnowledgeStore>,
        top_k: usize,
    ) -> Self {
        Self {
            reasoner,
            knowledge,
            top_k,
        }
    }

    pub fn prompt(context: &str, project_text: &str, question: &str) -> String {
        render(
            CHAT_TEMPLATE,
            &[
                ("context", context),
                ("project_text", project_text),
                ("question", question),
            ],
        )
    }

    /// Answers `question` using the snippets closest to it as context.
    ///
    /// The project text may be empty; the question may not.
    #[instrument(skip_all, fields(question_len = question.len(), top_k = self.top_k))]
    pub async fn answer(&self, project_text: &str, question: &str) -> Result<String, PipelineError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let context = self.knowledge.query(question, self.top_k).await?.join("\n");
        debug!(context_chars = context.len(), "Chat context retrieved");

        let request = ReasoningRequest::text(
            Self::prompt(&context, project_text.trim(), question),
            CHAT_TEMPERATURE,
        );
        Ok(self.reasoner.complete(request).await?.trim().to_string())
    }
}
