//! Shared test helpers for loop tests.

use std::sync::Mutex;
use taoloop_core::error::ProviderError;
use taoloop_core::provider::{Completion, CompletionRequest, Provider, Usage};

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue and
/// records the request it was given.
/// Panics if more calls are made than responses provided.
pub struct SequentialMockProvider {
    responses: Vec<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn from_texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| t.to_string()).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len();
        requests.push(request);

        let text = self.responses.get(index).unwrap_or_else(|| {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                index,
                self.responses.len()
            )
        });

        Ok(make_completion(text))
    }
}

/// Replays scripted responses, then fails every later call with a network error.
pub struct FailingProvider {
    responses: Vec<String>,
    error: String,
    call_count: Mutex<usize>,
}

impl FailingProvider {
    pub fn after(responses: Vec<String>, error: &str) -> Self {
        Self {
            responses,
            error: error.to_string(),
            call_count: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing_mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<Completion, ProviderError> {
        let mut count = self.call_count.lock().unwrap();
        let index = *count;
        *count += 1;

        match self.responses.get(index) {
            Some(text) => Ok(make_completion(text)),
            None => Err(ProviderError::Network(self.error.clone())),
        }
    }
}

/// Create a simple text completion.
pub fn make_completion(text: &str) -> Completion {
    Completion {
        content: text.to_string(),
        model: "mock-model".into(),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
    }
}
