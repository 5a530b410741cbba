//! Configuration manager for loading and saving application configuration
//!
//! The config directory is `%APPDATA%\MicrospecGui` on Windows and
//! `$XDG_CONFIG_HOME/microspec-gui` (or `~/.config/microspec-gui`) elsewhere.
//! Saves go through a temporary file in the same directory, persisted over the
//! old file in one rename.

use crate::config::models::AppConfig;
use crate::error::{MicrospecError, Result, StringError};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Directory holding `config.json` and the log files
    pub fn get_config_dir() -> PathBuf {
        if let Some(appdata) = non_empty_var("APPDATA") {
            return PathBuf::from(appdata).join("MicrospecGui");
        }
        if let Some(xdg) = non_empty_var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("microspec-gui");
        }
        if let Some(home) = non_empty_var("HOME") {
            return PathBuf::from(home).join(".config").join("microspec-gui");
        }
        PathBuf::from(".")
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.json")
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::get_config_dir();
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Load configuration from disk
    ///
    /// A missing file yields the defaults, which are written out as a starting
    /// point for editing. A file that fails to parse or validate is logged and
    /// replaced by the defaults in memory only; the file is left for the user
    /// to fix.
    pub fn load() -> Result<AppConfig> {
        let config_path = Self::get_config_path();

        if !config_path.exists() {
            info!("Configuration file not found, writing defaults");
            let config = AppConfig::default();
            if let Err(e) = Self::save(&config) {
                warn!("Failed to write default configuration: {}", e);
            }
            return Ok(config);
        }

        let json = std::fs::read_to_string(&config_path)?;

        let config: AppConfig = match serde_json::from_str(&json) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                return Ok(AppConfig::default());
            }
        };

        if let Err(e) = config.validate() {
            warn!("Invalid configuration, using defaults: {}", e);
            return Ok(AppConfig::default());
        }

        info!("Configuration loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save configuration to disk with atomic write
    pub fn save(config: &AppConfig) -> Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let json = serde_json::to_string_pretty(config)?;

        let mut temp = tempfile::NamedTempFile::new_in(&config_dir)?;
        temp.write_all(json.as_bytes())?;
        temp.flush()?;
        temp.persist(Self::get_config_path()).map_err(|e| {
            MicrospecError::ConfigError(StringError::new(format!(
                "Failed to replace config.json: {}",
                e.error
            )))
        })?;

        info!("Configuration saved to {}", Self::get_config_path().display());
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
