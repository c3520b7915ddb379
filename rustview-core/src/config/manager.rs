//! Configuration manager for TOML file operations
//!
//! This module provides the `ConfigManager` which handles loading and saving
//! the viewer settings file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

use super::settings::ViewerSettings;

const CONFIG_FILE: &str = "config.toml";

/// Configuration manager for `RustView`
///
/// Handles loading and saving the settings file in TOML format.
/// Configuration is stored in `~/.config/rustview/` by default.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Base directory for configuration files
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new `ConfigManager` with the default configuration directory
    ///
    /// The default directory is `~/.config/rustview/`
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join("rustview");
        Ok(Self { config_dir })
    }

    /// Creates a new `ConfigManager` with a custom configuration directory
    ///
    /// This is useful for testing or non-standard configurations.
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensures the configuration directory exists
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> ConfigResult<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                ConfigError::Write(format!(
                    "Failed to create config directory {}: {}",
                    self.config_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Loads the viewer settings
    ///
    /// Returns default settings if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_settings(&self) -> ConfigResult<ViewerSettings> {
        let path = self.config_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(ViewerSettings::default());
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Saves the viewer settings
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be serialized or written.
    pub fn save_settings(&self, settings: &ViewerSettings) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        let path = self.config_dir.join(CONFIG_FILE);
        let content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(&path, content).map_err(|e| {
            ConfigError::Write(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}
