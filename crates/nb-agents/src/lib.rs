//! Agent definitions and the summary loop for newsbrief.
//!
//! This crate provides:
//! - `InternalAgent` trait for defining agent behavior
//! - `NewsSummarizerAgent`, the single-tool news summarizer
//! - `SummaryLoop` and `news_summarizer`, which run it repeatedly

mod news_summarizer;
mod summary;

pub use news_summarizer::{summary_prompt, NewsSummarizerAgent};
pub use summary::{
    build_news_agent, news_summarizer, summarize, SummarizerSettings, SummaryLoop,
    SummaryOptions,
};

/// Trait for internal agents.
///
/// Internal agents are built-in agents with a fixed system prompt and the
/// set of tools they are allowed to call.
pub trait InternalAgent: Send + Sync {
    /// Get the agent name (e.g., "news-summarizer")
    fn name(&self) -> &str;

    /// Get the agent description for display
    fn description(&self) -> &str;

    /// Get the system prompt for this agent
    fn system_prompt(&self) -> &str;

    /// Get the tool names this agent needs
    fn tool_names(&self) -> &[&str];

    /// Get the default max iterations for the agentic loop
    fn max_turns(&self) -> usize {
        10
    }
}
