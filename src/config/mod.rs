//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - Built-in defaults
//! - CLI arguments (logging overrides)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;
use crate::intent::DetectorConfig;
use crate::session::SessionConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Focus engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Intent detector configuration
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Session queue and fan-out configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter ("trace", "debug", "info", "warn", "error")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format ("pretty", "compact", "json")
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Create the default configuration
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Validate every configuration section
    pub fn validate(&self) -> Result<()> {
        self.engine.validate().context("invalid [engine] section")?;
        self.detector
            .validate()
            .context("invalid [detector] section")?;
        self.session
            .validate()
            .context("invalid [session] section")?;

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            other => anyhow::bail!("invalid [logging] format: {}", other),
        }

        Ok(())
    }
}
