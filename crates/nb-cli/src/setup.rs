use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::config::Config;

const CONFIG_TEMPLATE: &str = r#"# newsbrief configuration
#
# API keys are read from environment variables by default:
#   NEWSDATA_API_KEY, OPENAI_API_KEY
# You can also set them directly in this file (not recommended).
# Any setting can be overridden with NEWSBRIEF_<SECTION>__<KEY>,
# e.g. NEWSBRIEF_SUMMARY__TOTAL_NEWS=3

# ── News search ──────────────────────────────────────────────────

[news]
# api_key = "pub_..."             # or set NEWSDATA_API_KEY env var
# base_url = "https://newsdata.io/api/1"
country = "in"
language = "en"
# query = "business"              # unset: latest headlines

# ── Language model ───────────────────────────────────────────────

[llm]
# api_key = "sk-..."              # or set OPENAI_API_KEY env var
# base_url = "https://api.openai.com/v1"
model = "gpt-3.5-turbo-0613"
temperature = 0.0
max_iterations = 10

# ── Summary loop ─────────────────────────────────────────────────

[summary]
character_limit = "175 characters"
total_news = 5
sleep_seconds = 20
"#;

/// Write the config template, asking before replacing an existing file.
pub fn run(path: Option<&Path>) -> Result<()> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::config_path()?,
    };

    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    }

    if config_path.exists() {
        println!("Existing config file found:");
        println!("  {}", config_path.display());
        print!("\nOverwrite? (Existing file will be backed up) [y/N] ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Setup cancelled.");
            return Ok(());
        }

        backup_file(&config_path)?;
    }

    write_template(&config_path)?;
    println!("Created {}", config_path.display());

    println!("\nNext steps:");
    println!("  1. Set your API keys:  export NEWSDATA_API_KEY=\"pub_...\" OPENAI_API_KEY=\"sk-...\"");
    println!("  2. Summarize:          newsbrief");
    println!("  3. Or pick a topic:    newsbrief -q business -n 3");

    Ok(())
}

fn write_template(path: &Path) -> Result<()> {
    std::fs::write(path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Back up a file to <name>.bak, appending a timestamp if .bak already exists.
fn backup_file(path: &Path) -> Result<()> {
    let mut backup = path.with_extension("toml.bak");

    if backup.exists() {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        backup = path.with_extension(format!("toml.bak.{}", timestamp));
    }

    std::fs::rename(path, &backup)
        .with_context(|| format!("Failed to back up {} to {}", path.display(), backup.display()))?;
    println!("  Backed up to {}", backup.display());

    Ok(())
}
