use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, ChatResponseFormat};
use tracing::{debug, error, instrument};

use super::{ReasoningError, ReasoningRequest, ReasoningService, ResponseFormat};

/// [`ReasoningService`] backed by the `genai` multi-provider client.
///
/// Provider credentials come from the provider's conventional environment variables
/// (for example `OPENAI_API_KEY`).
#[derive(Clone)]
pub struct GenaiReasoner {
    client: Client,
    model: String,
}

impl std::fmt::Debug for GenaiReasoner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiReasoner")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GenaiReasoner {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(Client::default(), model)
    }

    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn options(request: &ReasoningRequest) -> ChatOptions {
        let options = ChatOptions::default().with_temperature(request.temperature);
        match request.format {
            ResponseFormat::Json => options.with_response_format(ChatResponseFormat::JsonMode),
            ResponseFormat::Text => options,
        }
    }
}

#[async_trait]
impl ReasoningService for GenaiReasoner {
    #[instrument(skip(self, request), fields(model = %self.model, format = ?request.format, prompt_len = request.prompt.len()))]
    async fn complete(&self, request: ReasoningRequest) -> Result<String, ReasoningError> {
        let options = Self::options(&request);
        let chat_req = ChatRequest::new(vec![ChatMessage::user(request.prompt)]);

        let resp = self
            .client
            .exec_chat(&self.model, chat_req, Some(&options))
            .await
            .map_err(|e| {
                error!("Provider error: {}", e);
                ReasoningError::RequestFailed {
                    reason: e.to_string(),
                }
            })?;

        let text = resp
            .first_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(ReasoningError::EmptyResponse)?;

        debug!(response_len = text.len(), "Reasoning call completed");
        Ok(text)
    }
}
