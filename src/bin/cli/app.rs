use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::runtime::Runtime;

use lumiere_lib::config::AppConfig;
use lumiere_lib::content::{all_topics, Topic};
use lumiere_lib::credentials::KeyPrompt;
use lumiere_lib::AppContext;

/// Shared application state for CLI commands
pub struct App {
    pub ctx: AppContext,
    pub runtime: Runtime,
}

impl App {
    /// Initialize from the config file (or defaults)
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = AppConfig::load(config_path).context("Failed to load config")?;

        let prompt: Option<Box<dyn KeyPrompt>> = if std::io::stdin().is_terminal() {
            Some(Box::new(StdinKeyPrompt))
        } else {
            None
        };

        let ctx = AppContext::new(config, prompt).context("Failed to open app data")?;
        let runtime = Runtime::new().context("Failed to start async runtime")?;

        Ok(Self { ctx, runtime })
    }

    /// Find a topic by id or name (case-insensitive prefix match)
    pub fn find_topic(&self, name: &str) -> Result<&'static Topic> {
        let topics = all_topics();
        let name_lower = name.trim().to_lowercase();

        // Exact match first
        if let Some(topic) = topics
            .iter()
            .find(|t| t.id == name_lower || t.name.to_lowercase() == name_lower)
        {
            return Ok(topic);
        }

        // Prefix match
        let matches: Vec<&'static Topic> = topics
            .iter()
            .filter(|t| t.id.starts_with(&name_lower) || t.name.to_lowercase().starts_with(&name_lower))
            .collect();

        match matches.len() {
            0 => bail!(
                "No topic matching '{}'. Available topics:\n{}",
                name,
                topics.iter().map(|t| format!("  - {} ({})", t.id, t.name)).collect::<Vec<_>>().join("\n")
            ),
            1 => Ok(matches[0]),
            _ => bail!(
                "Ambiguous topic name '{}'. Matches:\n{}",
                name,
                matches.iter().map(|t| format!("  - {} ({})", t.id, t.name)).collect::<Vec<_>>().join("\n")
            ),
        }
    }
}

/// Asks for an API key on the terminal when one is needed
struct StdinKeyPrompt;

impl KeyPrompt for StdinKeyPrompt {
    fn prompt_for_key(&self) -> Option<String> {
        eprint!("Enter a Gemini API key (leave empty to cancel): ");
        std::io::stderr().flush().ok();
        read_line().filter(|key| !key.is_empty())
    }
}

/// One trimmed line from stdin, `None` at end of input
pub fn read_line() -> Option<String> {
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}
