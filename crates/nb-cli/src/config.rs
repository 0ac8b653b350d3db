use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use nb_agents::{SummarizerSettings, SummaryOptions};
use nb_tools::NewsQueryConfig;

/// Environment variable holding the NewsData.io key
pub const NEWS_KEY_VAR: &str = "NEWSDATA_API_KEY";
/// Environment variable holding the OpenAI key
pub const LLM_KEY_VAR: &str = "OPENAI_API_KEY";
/// Prefix for overriding any setting, e.g. `NEWSBRIEF_SUMMARY__TOTAL_NEWS=3`
pub const ENV_PREFIX: &str = "NEWSBRIEF_";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub news: NewsConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub summary: SummaryConfig,
}

/// News search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// NewsData.io API key (prefer NEWSDATA_API_KEY)
    pub api_key: Option<String>,

    /// Endpoint override
    pub base_url: Option<String>,

    pub country: String,

    pub language: String,

    /// Search term; unset means latest headlines
    pub query: Option<String>,
}

impl Default for NewsConfig {
    fn default() -> Self {
        let defaults = NewsQueryConfig::default();
        Self {
            api_key: None,
            base_url: None,
            country: defaults.country,
            language: defaults.language,
            query: None,
        }
    }
}

/// Language-model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// OpenAI API key (prefer OPENAI_API_KEY)
    pub api_key: Option<String>,

    /// Endpoint override for OpenAI-compatible servers
    pub base_url: Option<String>,

    pub model: String,

    pub temperature: f32,

    /// Upper bound on model turns per summary
    pub max_iterations: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let defaults = SummarizerSettings::new("", "");
        Self {
            api_key: None,
            base_url: None,
            model: defaults.model,
            temperature: defaults.temperature,
            max_iterations: defaults.max_iterations,
        }
    }
}

/// Loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Length limit stated to the model, e.g. "175 characters"
    pub character_limit: String,

    pub total_news: usize,

    pub sleep_seconds: u64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        let defaults = SummaryOptions::default();
        Self {
            character_limit: defaults.character_limit,
            total_news: defaults.total_news,
            sleep_seconds: defaults.sleep.as_secs(),
        }
    }
}

/// Expand environment variables in a path string
/// Supports: $VAR, ${VAR}, ~
pub fn expand_path(path: &str) -> PathBuf {
    let mut result = path.to_string();

    // Expand ~ at the start
    if result.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            result = format!("{}{}", home.display(), &result[1..]);
        }
    } else if result == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }

    // Expand $VAR and ${VAR}
    let re = regex::Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)\}?").expect("valid regex");
    let expanded = re.replace_all(&result, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    });

    PathBuf::from(expanded.to_string())
}

impl Config {
    /// Layered sources, lowest precedence first: defaults, the TOML file,
    /// the well-known key variables, then `NEWSBRIEF_*` variables.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::raw().only(&[NEWS_KEY_VAR]).map(|_| "news.api_key".into()))
            .merge(Env::raw().only(&[LLM_KEY_VAR]).map(|_| "llm.api_key".into()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load from `path`, or the default location when `None`.
    /// A missing file is not an error; keys may come from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        Self::figment(&path)
            .extract()
            .with_context(|| format!("Invalid configuration (file: {})", path.display()))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("newsbrief"))
    }

    pub fn query_config(&self) -> NewsQueryConfig {
        NewsQueryConfig {
            country: self.news.country.clone(),
            language: self.news.language.clone(),
        }
    }

    /// Resolve the NewsData key or explain where to put it.
    pub fn news_api_key(&self) -> Result<String> {
        self.news.api_key.clone().filter(|k| !k.is_empty()).with_context(|| {
            format!(
                "NewsData API key not found. Set {} or [news] api_key in the config file",
                NEWS_KEY_VAR
            )
        })
    }

    /// Resolve the OpenAI key or explain where to put it.
    pub fn llm_api_key(&self) -> Result<String> {
        self.llm.api_key.clone().filter(|k| !k.is_empty()).with_context(|| {
            format!(
                "LLM API key not found. Set {} or [llm] api_key in the config file",
                LLM_KEY_VAR
            )
        })
    }

    pub fn summarizer_settings(&self) -> Result<SummarizerSettings> {
        let mut settings = SummarizerSettings::new(self.news_api_key()?, self.llm_api_key()?)
            .with_search_query(self.news.query.clone());
        settings.news_base_url = self.news.base_url.clone();
        settings.query_config = self.query_config();
        settings.llm_base_url = self.llm.base_url.clone();
        settings.model = self.llm.model.clone();
        settings.temperature = self.llm.temperature;
        settings.max_iterations = self.llm.max_iterations;
        Ok(settings)
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            character_limit: self.summary.character_limit.clone(),
            total_news: self.summary.total_news,
            sleep: Duration::from_secs(self.summary.sleep_seconds),
        }
    }
}

/// Render a secret for display without revealing it.
pub fn redact(secret: &Option<String>) -> &'static str {
    match secret {
        Some(s) if !s.is_empty() => "<set>",
        _ => "<not set>",
    }
}
