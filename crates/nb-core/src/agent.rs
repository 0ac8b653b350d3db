//! Tool-calling agent loop.
//!
//! This module provides:
//! - `AgentRunner`, the single capability callers depend on: given a prompt,
//!   produce free text
//! - `ToolAgent`, which implements it by letting an LLM provider call the
//!   tools in a `ToolRegistry` until it answers in plain text

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Error;
use crate::message::{Message, ToolCall};
use crate::provider::{CompletionRequest, Provider};
use crate::tool::ToolRegistry;

/// Unique identifier for an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AgentId(pub String);

impl AgentId {
    /// Create a new agent ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Configuration for an agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Unique agent identifier.
    pub id: AgentId,
    /// System prompt for the agent.
    pub system_prompt: Option<String>,
    /// Model override; falls back to the provider default.
    pub model: Option<String>,
    /// Sampling temperature sent with every request.
    pub temperature: Option<f32>,
    /// Maximum agentic loop iterations.
    pub max_iterations: usize,
}

impl AgentConfig {
    /// Create a new agent configuration.
    pub fn new(id: impl Into<AgentId>) -> Self {
        Self {
            id: id.into(),
            system_prompt: None,
            model: None,
            temperature: None,
            max_iterations: 10,
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum iterations.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}

/// Produces free text for a prompt.
///
/// Whether and when tools are consulted along the way is up to the
/// implementation; callers only see the final answer or the error that
/// stopped it.
#[async_trait]
pub trait AgentRunner: Send + Sync {
    async fn run(&self, prompt: &str) -> Result<String, Error>;
}

/// An LLM-powered agent that answers a prompt, calling registered tools as
/// the model requests them.
///
/// Stateless: every `run` starts from the system prompt and the given task.
pub struct ToolAgent {
    config: AgentConfig,
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
}

impl ToolAgent {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, config: AgentConfig) -> Self {
        Self {
            config,
            provider,
            tools,
        }
    }

    fn build_request(&self, messages: &[Message]) -> CompletionRequest {
        let mut request =
            CompletionRequest::new(messages.to_vec()).with_tools(self.tools.definitions());
        if let Some(model) = &self.config.model {
            request = request.with_model(model);
        }
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }
}

#[async_trait]
impl AgentRunner for ToolAgent {
    async fn run(&self, prompt: &str) -> Result<String, Error> {
        let config = &self.config;

        debug!(
            agent = %config.id,
            tools_available = self.tools.len(),
            "Agent run starting"
        );

        let mut messages = Vec::new();
        if let Some(system) = &config.system_prompt {
            messages.push(Message::system(system.as_str()));
        }
        messages.push(Message::user(prompt));

        for iteration in 0..config.max_iterations {
            debug!(
                agent = %config.id,
                iteration = iteration,
                message_count = messages.len(),
                "Agent iteration starting"
            );

            let response = self.provider.complete(self.build_request(&messages)).await?;
            let tool_calls = response.message.tool_calls;

            if !tool_calls.is_empty() {
                debug!(
                    agent = %config.id,
                    tool_count = tool_calls.len(),
                    "Agent executing tools"
                );

                messages.push(Message::assistant_with_tool_calls(
                    response.message.content,
                    tool_calls.clone(),
                ));

                for tool_call in &tool_calls {
                    debug!(agent = %config.id, tool = %tool_call.name, "Executing tool");
                    let result = execute_tool(&self.tools, tool_call).await?;
                    messages.push(Message::tool_result(&tool_call.id, result));
                }

                continue;
            }

            debug!(
                agent = %config.id,
                iterations = iteration + 1,
                response_len = response.message.content.len(),
                "Agent completed successfully"
            );
            return Ok(response.message.content);
        }

        Err(Error::Unknown(format!(
            "Agent {} exceeded max iterations ({})",
            config.id, config.max_iterations
        )))
    }
}

/// Execute a single tool call.
///
/// Unknown tools and soft tool failures are rendered as text for the model;
/// a tool returning `Err` aborts the run.
async fn execute_tool(registry: &ToolRegistry, tool_call: &ToolCall) -> Result<String, Error> {
    let Some(tool) = registry.get(&tool_call.name) else {
        return Ok(format!("Error: Unknown tool '{}'", tool_call.name));
    };

    let output = tool.execute(tool_call.arguments.clone()).await?;
    if output.is_error {
        Ok(format!("Error: {}", output.content))
    } else {
        Ok(output.content)
    }
}
