//! Configuration module
//!
//! Handles driver settings: device endpoint, polling and retry policy, bus
//! topic names and logging.

mod settings;

pub use settings::{AppConfig, BusSettings, ConfigError, DriverSettings, LoggingConfig};

use directories::ProjectDirs;
use std::path::PathBuf;

/// Get the application configuration directory
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "ins-driver", "INS Driver")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the application data directory
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "ins-driver", "INS Driver")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the log directory
pub fn log_dir() -> Option<PathBuf> {
    data_dir().map(|d| d.join("logs"))
}

/// Default location of `config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}
