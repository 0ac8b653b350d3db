use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nb_agents::summarize;
use nb_tools::{NewsDataClient, NewsFetcher};

mod config;
mod setup;

use config::{expand_path, redact, Config};

/// Log level for tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Most verbose: includes HTTP client internals
    Trace,
    /// Verbose: requests, agent turns, tool calls
    Debug,
    /// Standard: one line per summary iteration
    Info,
    /// Quiet: only warnings and errors
    Warn,
    /// Minimal: only errors
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How summaries are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Numbered plain text
    Text,
    /// Pretty-printed JSON array
    Json,
}

#[derive(Parser)]
#[command(name = "newsbrief")]
#[command(author, version, about = "newsbrief: short LLM summaries of the latest news", long_about = None)]
pub struct Cli {
    /// Search term for the news service (default: latest headlines)
    #[arg(short, long, global = true)]
    pub query: Option<String>,

    /// Length limit stated to the model, e.g. "175 characters"
    #[arg(short, long, global = true)]
    pub limit: Option<String>,

    /// Number of summaries to collect
    #[arg(short = 'n', long, global = true)]
    pub count: Option<usize>,

    /// Seconds to pause after each summary
    #[arg(short, long, global = true)]
    pub sleep: Option<u64>,

    /// Model to use (overrides config default)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Config file (default: <config dir>/newsbrief/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Enable debug logging (shorthand for --log-level debug)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Write logs to file (JSON-lines format)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Fetch and summarize the latest news (default)
    Run,
    /// Fetch one article and print it without summarizing
    Fetch,
    /// Show current configuration
    Config,
    /// Initialize configuration file in the newsbrief config directory
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --debug overrides --log-level
    let log_level = if cli.debug {
        LogLevel::Debug
    } else {
        cli.log_level
    };

    let filter = EnvFilter::new(log_level.as_filter());

    if let Some(log_path) = &cli.log_file {
        let file = std::fs::File::create(log_path)
            .with_context(|| format!("Failed to create log file: {:?}", log_path))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::sync::Mutex::new(file)))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.as_deref().map(expand_path);

    // Handle setup before config is required
    if matches!(&cli.command, Some(Commands::Setup)) {
        return setup::run(config_path.as_deref());
    }

    let mut config = Config::load(config_path.as_deref())?;
    apply_overrides(&mut config, &cli);

    match &cli.command {
        Some(Commands::Fetch) => fetch_mode(&cli, &config).await,
        Some(Commands::Config) => show_config(&config),
        Some(Commands::Setup) => unreachable!(),
        Some(Commands::Run) | None => summary_mode(&cli, &config).await,
    }
}

/// CLI flags are the highest-precedence configuration layer.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(query) = &cli.query {
        config.news.query = Some(query.clone());
    }
    if let Some(limit) = &cli.limit {
        config.summary.character_limit = limit.clone();
    }
    if let Some(count) = cli.count {
        config.summary.total_news = count;
    }
    if let Some(sleep) = cli.sleep {
        config.summary.sleep_seconds = sleep;
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
}

async fn summary_mode(cli: &Cli, config: &Config) -> Result<()> {
    let settings = config.summarizer_settings()?;
    let options = config.summary_options();

    tracing::debug!(settings = ?settings, options = ?options, "Starting summary loop");

    let summaries = summarize(&settings, options)
        .await
        .context("News summarization failed")?;

    println!("{}", render_summaries(&summaries, cli.format)?);
    Ok(())
}

async fn fetch_mode(cli: &Cli, config: &Config) -> Result<()> {
    let mut client =
        NewsDataClient::new(config.news_api_key()?).with_query_config(config.query_config());
    if let Some(url) = &config.news.base_url {
        client = client.with_base_url(url);
    }
    let fetcher = NewsFetcher::new(client, config.news.query.clone());

    let article = fetcher
        .fetch_latest()
        .await
        .context("Failed to fetch a news article")?;

    match cli.format {
        OutputFormat::Text => println!("{}", article),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&article)?),
    }
    Ok(())
}

fn render_summaries(summaries: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(summaries
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}. {}", i + 1, s.trim()))
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            serde_json::to_string_pretty(summaries).context("Failed to encode summaries")
        }
    }
}

fn show_config(config: &Config) -> Result<()> {
    println!("Configuration:");

    println!("\nNews:");
    println!("  API key: {}", redact(&config.news.api_key));
    if let Some(url) = &config.news.base_url {
        println!("  Base URL: {}", url);
    }
    println!("  Country: {}", config.news.country);
    println!("  Language: {}", config.news.language);
    println!(
        "  Query: {}",
        config.news.query.as_deref().unwrap_or("(latest headlines)")
    );

    println!("\nLLM:");
    println!("  API key: {}", redact(&config.llm.api_key));
    if let Some(url) = &config.llm.base_url {
        println!("  Base URL: {}", url);
    }
    println!("  Model: {}", config.llm.model);
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Max iterations: {}", config.llm.max_iterations);

    println!("\nSummary:");
    println!("  Character limit: {}", config.summary.character_limit);
    println!("  Total news: {}", config.summary.total_news);
    println!("  Sleep: {}s", config.summary.sleep_seconds);

    println!("\nConfig file: {}", Config::config_path()?.display());
    Ok(())
}
