pub mod settings;

pub use settings::Config;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV: &str = "SCOUT_CONFIG";

/// Get the configuration file path
///
/// `SCOUT_CONFIG` wins over the platform config directory.
pub fn config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    let config_dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("scout");

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from the default location, falling back to defaults
/// when no file exists. Nothing is ever written.
pub fn load_or_default() -> Result<Config> {
    let path = config_path()?;
    load_from(&path)
}

/// Load configuration from an explicit path (defaults if the file is missing)
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
