// Configuration loading
// Loads the API key from ~/.tenet/config.toml or the environment.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_key: String,
    /// Default model; provider default when absent.
    #[serde(default)]
    pub model: Option<String>,
}

/// Path of the user config file: `~/.tenet/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".tenet").join("config.toml"))
}

/// Load configuration from the config file, falling back to the
/// `ANTHROPIC_API_KEY` environment variable.
pub fn load_config() -> Result<Config> {
    let path = config_path()?;
    if path.exists() {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        return Ok(config);
    }

    if let Ok(api_key) = std::env::var("ANTHROPIC_API_KEY") {
        if !api_key.is_empty() {
            return Ok(Config {
                api_key,
                model: None,
            });
        }
    }

    bail!(
        "No configuration found. Create ~/.tenet/config.toml with an `api_key` \
         entry, or set the ANTHROPIC_API_KEY environment variable."
    );
}
