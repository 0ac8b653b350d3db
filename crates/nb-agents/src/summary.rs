//! The summary loop: ask the agent for a news summary, collect it, pause,
//! repeat.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use nb_core::{AgentConfig, AgentRunner, Error, Tool, ToolAgent, ToolRegistry};
use nb_providers::OpenAIProvider;
use nb_tools::{LatestNewsTool, NewsDataClient, NewsFetcher, NewsQueryConfig};

use crate::news_summarizer::{summary_prompt, NewsSummarizerAgent};
use crate::InternalAgent;

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";
pub const DEFAULT_CHARACTER_LIMIT: &str = "175 characters";
pub const DEFAULT_TOTAL_NEWS: usize = 5;
pub const DEFAULT_SLEEP_SECONDS: u64 = 20;

/// Everything needed to wire the news fetcher and the LLM agent together.
#[derive(Clone)]
pub struct SummarizerSettings {
    pub news_api_key: String,
    /// Override for the NewsData.io endpoint
    pub news_base_url: Option<String>,
    pub query_config: NewsQueryConfig,
    /// Search term; `None` asks for the latest headlines
    pub search_query: Option<String>,
    pub llm_api_key: String,
    /// Override for the OpenAI-compatible endpoint
    pub llm_base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_iterations: usize,
}

impl SummarizerSettings {
    pub fn new(news_api_key: impl Into<String>, llm_api_key: impl Into<String>) -> Self {
        Self {
            news_api_key: news_api_key.into(),
            news_base_url: None,
            query_config: NewsQueryConfig::default(),
            search_query: None,
            llm_api_key: llm_api_key.into(),
            llm_base_url: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_iterations: NewsSummarizerAgent::new().max_turns(),
        }
    }

    pub fn with_search_query(mut self, query: Option<String>) -> Self {
        self.search_query = query;
        self
    }
}

impl std::fmt::Debug for SummarizerSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerSettings")
            .field("news_api_key", &"<redacted>")
            .field("news_base_url", &self.news_base_url)
            .field("query_config", &self.query_config)
            .field("search_query", &self.search_query)
            .field("llm_api_key", &"<redacted>")
            .field("llm_base_url", &self.llm_base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

/// Instantiate a tool an agent definition asks for by name.
fn tool_for_name(name: &str, settings: &SummarizerSettings) -> Result<Arc<dyn Tool>, Error> {
    match name {
        "latest_news" => {
            let mut news_client = NewsDataClient::new(&settings.news_api_key)
                .with_query_config(settings.query_config.clone());
            if let Some(url) = &settings.news_base_url {
                news_client = news_client.with_base_url(url);
            }
            let fetcher = NewsFetcher::new(news_client, settings.search_query.clone());
            Ok(Arc::new(LatestNewsTool::new(fetcher)))
        }
        other => Err(Error::config(format!("No tool named '{}'", other))),
    }
}

/// Build the single-tool agent: an OpenAI client pinned to the configured
/// temperature, with the tools the news-summarizer definition names.
pub fn build_news_agent(settings: &SummarizerSettings) -> Result<ToolAgent, Error> {
    let definition = NewsSummarizerAgent::new();

    let mut tools = ToolRegistry::new();
    for name in definition.tool_names() {
        tools.register(tool_for_name(name, settings)?);
    }

    let mut provider = OpenAIProvider::new(&settings.llm_api_key).with_default_model(&settings.model);
    if let Some(url) = &settings.llm_base_url {
        provider = provider.with_base_url(url);
    }

    let config = AgentConfig::new(definition.name())
        .with_system_prompt(definition.system_prompt())
        .with_model(&settings.model)
        .with_temperature(settings.temperature)
        .with_max_iterations(settings.max_iterations);

    debug!(
        agent = definition.name(),
        description = definition.description(),
        tools = ?tools.names(),
        settings = ?settings,
        "Built news agent"
    );

    Ok(ToolAgent::new(Arc::new(provider), Arc::new(tools), config))
}

/// How many summaries to collect and how to pace them.
#[derive(Debug, Clone)]
pub struct SummaryOptions {
    /// Free-text length limit stated in the prompt (e.g., "175 characters")
    pub character_limit: String,
    pub total_news: usize,
    /// Pause after every iteration, the last one included
    pub sleep: Duration,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            character_limit: DEFAULT_CHARACTER_LIMIT.to_string(),
            total_news: DEFAULT_TOTAL_NEWS,
            sleep: Duration::from_secs(DEFAULT_SLEEP_SECONDS),
        }
    }
}

pub struct SummaryLoop {
    runner: Arc<dyn AgentRunner>,
    options: SummaryOptions,
}

impl SummaryLoop {
    pub fn new(runner: Arc<dyn AgentRunner>, options: SummaryOptions) -> Self {
        Self { runner, options }
    }

    pub fn options(&self) -> &SummaryOptions {
        &self.options
    }

    /// Run `total_news` iterations and return one summary per iteration.
    ///
    /// The first failing invocation ends the loop; its error is returned and
    /// the summaries collected so far are dropped.
    pub async fn run(&self) -> Result<Vec<String>, Error> {
        let prompt = summary_prompt(&self.options.character_limit);
        let total = self.options.total_news;
        let mut responses = Vec::with_capacity(total);

        for iteration in 1..=total {
            info!(iteration, total, "Requesting news summary");

            let response = self.runner.run(&prompt).await?;
            if response.trim().is_empty() {
                warn!(iteration, "Agent returned an empty summary");
            }
            responses.push(response);

            debug!(iteration, sleep_secs = self.options.sleep.as_secs_f64(), "Pausing");
            tokio::time::sleep(self.options.sleep).await;
        }

        Ok(responses)
    }
}

/// Build the news agent from `settings` and run the loop with `options`.
pub async fn summarize(
    settings: &SummarizerSettings,
    options: SummaryOptions,
) -> Result<Vec<String>, Error> {
    let agent = build_news_agent(settings)?;
    SummaryLoop::new(Arc::new(agent), options).run().await
}

/// Fetch and summarize `total_news` articles with the default wiring.
pub async fn news_summarizer(
    news_api_key: &str,
    llm_api_key: &str,
    character_limit: &str,
    total_news: usize,
    sleep_seconds: u64,
    search_query: Option<&str>,
) -> Result<Vec<String>, Error> {
    let settings = SummarizerSettings::new(news_api_key, llm_api_key)
        .with_search_query(search_query.map(String::from));
    let options = SummaryOptions {
        character_limit: character_limit.to_string(),
        total_news,
        sleep: Duration::from_secs(sleep_seconds),
    };

    summarize(&settings, options).await
}
