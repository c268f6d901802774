use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{ReasoningError, ReasoningRequest, ReasoningService};

/// Scripted [`ReasoningService`]: answers calls from a queue and records every request.
#[derive(Default)]
pub struct MockReasoner {
    script: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<ReasoningRequest>>,
}

impl MockReasoner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers successive calls with `responses`, in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::default();
        for response in responses {
            mock.push_response(response);
        }
        mock
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.script.lock().push_back(Ok(response.into()));
    }

    /// Queues a transport failure.
    pub fn push_failure(&self, reason: impl Into<String>) {
        self.script.lock().push_back(Err(reason.into()));
    }

    pub fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ReasoningService for MockReasoner {
    async fn complete(&self, request: ReasoningRequest) -> Result<String, ReasoningError> {
        let call = {
            let mut requests = self.requests.lock();
            requests.push(request);
            requests.len()
        };

        match self.script.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(reason)) => Err(ReasoningError::RequestFailed { reason }),
            None => Err(ReasoningError::ScriptExhausted { call }),
        }
    }
}
