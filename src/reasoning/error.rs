use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("reasoning request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("reasoning service returned no text")]
    EmptyResponse,

    #[error("mock reasoner has no scripted response left (call {call})")]
    ScriptExhausted { call: usize },
}
