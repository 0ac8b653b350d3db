//! Summarizer agent for the latest news.

use crate::InternalAgent;

const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Build the instruction sent on every loop iteration.
///
/// `limit` is free text such as "175 characters"; it is only stated to the
/// model, never checked against the answer.
pub fn summary_prompt(limit: &str) -> String {
    format!(
        "Your task is to get the latest news and then generate a short summary of it. \
         Summarize the news in at most {limit}. Keep it as short as possible. \
         The summary must never exceed the {limit} limit."
    )
}

pub struct NewsSummarizerAgent;

impl NewsSummarizerAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NewsSummarizerAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl InternalAgent for NewsSummarizerAgent {
    fn name(&self) -> &str {
        "news-summarizer"
    }

    fn description(&self) -> &str {
        "Fetches the latest news article and summarizes it within a length limit"
    }

    fn system_prompt(&self) -> &str {
        SYSTEM_PROMPT
    }

    fn tool_names(&self) -> &[&str] {
        &["latest_news"]
    }
}
