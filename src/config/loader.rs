//! Configuration loading and persistence
//!
//! The config file only persists the theme selection; everything else in the
//! model is in-memory state.

use super::paths;
use super::schema::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the default location, falling back to
    /// built-in defaults when no file exists.
    pub fn load() -> Config {
        Self::load_file(&paths::root_config_path()).unwrap_or_default()
    }

    /// Load configuration from a file
    pub fn load_file(path: &PathBuf) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Persist the theme name, preserving whatever else is in the file.
    pub fn persist_theme(theme_name: &str) -> Result<()> {
        let path = paths::root_config_path();
        let mut config = Self::load_file(&path).unwrap_or_default();
        config.appearance.theme = theme_name.to_string();
        Self::save(&config, &path)
    }
}
