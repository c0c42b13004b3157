//! Driver settings

use crate::core::logger::LogFormat;
use crate::core::transport::TcpConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
/// Largest reply buffer accepted; it is allocated on every query
pub const MAX_REPLY_BUFFER: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No per-user config directory on this platform
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// INS endpoint
    pub device: TcpConfig,
    /// Drive loop policy
    pub driver: DriverSettings,
    /// Host bus topic names
    pub bus: BusSettings,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load config from the per-user config directory, or defaults if absent
    pub fn load() -> Result<Self, ConfigError> {
        let path = super::default_config_path().ok_or(ConfigError::NoConfigDir)?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.device.host.trim().is_empty() {
            return Err(ConfigError::Invalid("device.host is empty".into()));
        }
        if self.device.port == 0 {
            return Err(ConfigError::Invalid("device.port must be non-zero".into()));
        }
        if self.device.connect_timeout_ms == 0 || self.device.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid("device timeouts must be non-zero".into()));
        }
        if self.device.reply_buffer == 0 || self.device.reply_buffer > MAX_REPLY_BUFFER {
            return Err(ConfigError::Invalid(format!(
                "device.reply_buffer must be between 1 and {MAX_REPLY_BUFFER} bytes"
            )));
        }
        if self.driver.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("driver.poll_interval_ms must be non-zero".into()));
        }
        if self.driver.event_buffer == 0 {
            return Err(ConfigError::Invalid("driver.event_buffer must be non-zero".into()));
        }
        Ok(())
    }
}

/// Drive loop policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Polling period of the drive loop in milliseconds
    pub poll_interval_ms: u64,
    /// Failed attempts tolerated before a command is dropped
    pub max_retries: u32,
    /// Capacity of the inbound event channel
    pub event_buffer: usize,
}

impl DriverSettings {
    /// Polling period
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            max_retries: 7,
            event_buffer: 5,
        }
    }
}

/// Host bus topic names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    /// Inbound operator commands
    pub command_topic: String,
    /// Inbound GPS fixes
    pub fix_topic: String,
    /// Outbound query replies
    pub response_topic: String,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            command_topic: "/ins/command".to_string(),
            fix_topic: "/gps_coordinates".to_string(),
            response_topic: "/ins/command/response".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (`RUST_LOG` takes precedence)
    pub level: String,
    /// Write a daily rolling log file here as well as stderr
    pub directory: Option<PathBuf>,
    /// Record TX/RX frames to this file
    pub wire_log: Option<PathBuf>,
    /// Wire log format
    pub wire_log_format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            wire_log: None,
            wire_log_format: LogFormat::Text,
        }
    }
}
