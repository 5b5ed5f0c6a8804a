//! Mock model client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage};

/// A response handler that answers based on the request.
type ResponseHandler = Box<dyn Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync>;

/// A request the mock received, for assertions.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Mock implementation of [`LlmClient`].
///
/// Answers, in order of precedence:
/// 1. scripted results queued with `push_text` / `push_error`
/// 2. the handler set with `set_handler`
/// 3. the default text (`"{}"` unless changed)
///
/// Every request is recorded.
///
/// # Example
///
/// ```rust,ignore
/// use incident_eval_core::testing::MockLlmClient;
///
/// let client = MockLlmClient::new();
/// client.push_text("```json\n{\"root_cause\": \"Code Regression\"}\n```");
/// client.push_error(LlmError::Timeout(Duration::from_secs(30)));
///
/// // ... run the code under test ...
///
/// assert_eq!(client.request_count(), 2);
/// ```
pub struct MockLlmClient {
    scripted: Mutex<VecDeque<Result<String, LlmError>>>,
    handler: Mutex<Option<Arc<ResponseHandler>>>,
    default_text: Mutex<String>,
    requests: Mutex<Vec<RecordedRequest>>,
    delay: Mutex<Option<Duration>>,
}

impl std::fmt::Debug for MockLlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLlmClient")
            .field("scripted", &"<scripted>")
            .field("handler", &"<handler>")
            .field("requests", &self.request_count())
            .finish()
    }
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            handler: Mutex::new(None),
            default_text: Mutex::new("{}".to_string()),
            requests: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }

    /// Create a mock that always answers with `text`.
    pub fn with_default(text: impl Into<String>) -> Self {
        let client = Self::new();
        client.set_default_text(text);
        client
    }

    /// Queue a successful response.
    pub fn push_text(&self, text: impl Into<String>) {
        lock(&self.scripted).push_back(Ok(text.into()));
    }

    /// Queue a provider failure.
    pub fn push_error(&self, error: LlmError) {
        lock(&self.scripted).push_back(Err(error));
    }

    /// Answer unscripted requests with `handler`.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: Fn(&CompletionRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        *lock(&self.handler) = Some(Arc::new(Box::new(handler)));
    }

    pub fn set_default_text(&self, text: impl Into<String>) {
        *lock(&self.default_text) = text.into();
    }

    /// Simulate network latency on every call.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = Some(delay);
    }

    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_result(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if let Some(scripted) = lock(&self.scripted).pop_front() {
            return scripted;
        }
        let handler = lock(&self.handler).clone();
        match handler {
            Some(handler) => handler(request),
            None => Ok(lock(&self.default_text).clone()),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        lock(&self.requests).push(RecordedRequest {
            system: request.system.clone(),
            prompt: request.prompt.clone(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        });

        let delay = *lock(&self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let text = self.next_result(&request)?;
        Ok(CompletionResponse {
            usage: LlmUsage {
                input_tokens: request.prompt.len() as u32 / 4,
                output_tokens: text.len() as u32 / 4,
            },
            text,
            model: "mock-model".to_string(),
        })
    }
}
