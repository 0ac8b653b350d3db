//! nb-core: Core types and traits for newsbrief
//!
//! This crate provides the foundational types and traits used throughout
//! the newsbrief workspace: the error type, chat messages, the `Provider`
//! and `Tool` seams, and the tool-calling agent loop.

pub mod agent;
pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use agent::{AgentConfig, AgentId, AgentRunner, ToolAgent};
pub use error::Error;
pub use message::{Message, Role, ToolCall, Usage};
pub use provider::{CompletionRequest, CompletionResponse, FinishReason, Provider};
pub use tool::{Tool, ToolDefinition, ToolOutput, ToolParameters, ToolRegistry};

pub type Result<T> = std::result::Result<T, Error>;
