//! Configuration management for modal-relay
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_GENERATED, DEFAULT_ID_ATTEMPTS, DEFAULT_MAX_DISPLAY_MS,
    LOCAL_CONFIG_FILE_NAME, MAX_DIALOG_EXPIRY_SECS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub dialogs: DialogConfig,
    pub notifications: NotificationConfig,
    pub logging: LoggingConfig,
}

/// Dialog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// How many fresh ids to try when a generated id collides with a pending dialog
    pub id_attempts: u32,
    /// Pending dialogs older than this are abandoned by `expire_stale_dialogs` (0 = never)
    pub expiry_secs: u64,
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Upper bound applied to a notification's display duration
    pub max_display_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write logs to the log file
    pub enabled: bool,
    /// One of "off", "error", "warn", "info", "debug", "trace"
    pub level: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            id_attempts: DEFAULT_ID_ATTEMPTS,
            expiry_secs: 0,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            max_display_ms: DEFAULT_MAX_DISPLAY_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.dialogs.id_attempts == 0 {
            anyhow::bail!("id_attempts must be at least 1");
        }

        if self.dialogs.expiry_secs > MAX_DIALOG_EXPIRY_SECS {
            anyhow::bail!(
                "expiry_secs cannot exceed {} (24 hours), got {}",
                MAX_DIALOG_EXPIRY_SECS,
                self.dialogs.expiry_secs
            );
        }

        if self.notifications.max_display_ms == 0 {
            anyhow::bail!("max_display_ms must be greater than 0");
        }

        if let Err(e) = crate::logger::parse_level(&self.logging.level) {
            anyhow::bail!("Invalid logging level: {}", e);
        }

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        let header = format!(
            "# modal-relay Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join(CONFIG_DIR_NAME))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join(CONFIG_FILE_NAME))
    }
}
