//! Test utilities shared across the workspace.
//! Only compiled when running tests or with the `testing` feature.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::agent::AgentRunner;
use crate::error::Error;
use crate::message::{Message, ToolCall, Usage};
use crate::provider::{CompletionRequest, CompletionResponse, FinishReason, Provider};
use crate::tool::{Tool, ToolOutput};

/// A mock provider that returns pre-configured responses.
pub struct MockProvider {
    responses: Mutex<Vec<Result<CompletionResponse, Error>>>,
    /// Captured requests (for assertion).
    pub captured_requests: Mutex<Vec<CompletionRequest>>,
    pub name: String,
    pub default_model: Option<String>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            captured_requests: Mutex::new(Vec::new()),
            name: "mock".to_string(),
            default_model: None,
        }
    }

    fn response(message: Message, finish_reason: FinishReason) -> CompletionResponse {
        CompletionResponse {
            message,
            usage: Usage::new(0, 0),
            model: "mock-model".to_string(),
            finish_reason,
        }
    }

    /// Queue a plain text answer for the next complete() call.
    /// Responses are returned in FIFO order (first queued = first returned).
    pub fn queue_response(&self, content: &str) {
        let response = Self::response(Message::assistant(content), FinishReason::Stop);
        self.responses.lock().unwrap().insert(0, Ok(response));
    }

    /// Queue an answer asking for a single argument-less tool call.
    pub fn queue_tool_call(&self, id: &str, tool: &str) {
        let call = ToolCall::new(id, tool, serde_json::json!({}));
        let response = Self::response(
            Message::assistant_with_tool_calls("", vec![call]),
            FinishReason::ToolCalls,
        );
        self.responses.lock().unwrap().insert(0, Ok(response));
    }

    /// Queue a failure for the next complete() call.
    pub fn queue_error(&self, error: Error) {
        self.responses.lock().unwrap().insert(0, Err(error));
    }

    /// Get the number of captured requests.
    pub fn request_count(&self) -> usize {
        self.captured_requests.lock().unwrap().len()
    }

    /// Get the last captured request.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.captured_requests.lock().unwrap().last().cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn default_model(&self) -> Option<&str> {
        self.default_model.as_deref()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, Error> {
        self.captured_requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().pop() {
            Some(response) => response,
            None => Err(Error::Unknown("No mock response queued".to_string())),
        }
    }
}

/// A tool that always returns the same text, or fails once with a given error.
pub struct StaticTool {
    name: String,
    content: String,
    failure: Mutex<Option<Error>>,
    /// Number of times execute() was called.
    pub calls: Mutex<usize>,
}

impl StaticTool {
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
            failure: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    pub fn failing(name: &str, error: Error) -> Self {
        Self {
            failure: Mutex::new(Some(error)),
            ..Self::new(name, "")
        }
    }
}

#[async_trait]
impl Tool for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Static test tool"
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolOutput, Error> {
        *self.calls.lock().unwrap() += 1;
        match self.failure.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(ToolOutput::success(self.content.clone())),
        }
    }
}

/// An `AgentRunner` that replays queued outcomes and records every call.
pub struct ScriptedRunner {
    outcomes: Mutex<Vec<Result<String, Error>>>,
    /// Prompts received, in call order.
    pub prompts: Mutex<Vec<String>>,
    /// Tokio clock reading at each call (honours a paused test clock).
    pub call_times: Mutex<Vec<tokio::time::Instant>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            call_times: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful answer (FIFO).
    pub fn queue_answer(&self, answer: &str) {
        self.outcomes.lock().unwrap().insert(0, Ok(answer.to_string()));
    }

    /// Queue a failure (FIFO).
    pub fn queue_error(&self, error: Error) {
        self.outcomes.lock().unwrap().insert(0, Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentRunner for ScriptedRunner {
    async fn run(&self, prompt: &str) -> Result<String, Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.call_times.lock().unwrap().push(tokio::time::Instant::now());
        self.outcomes
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(Error::Unknown("No scripted answer queued".to_string())))
    }
}
