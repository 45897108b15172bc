//! Configuration module for measure-rs
//!
//! This module handles session configuration:
//! - Where data files go (data directory, fixed output file, delimiter)
//! - How the command listener polls
//! - Whether a plot window is shown, and how it renders
//! - Where log files are written
//!
//! # Config Location
//!
//! Without an explicit `--config` path the session reads
//! `session.toml` from the platform configuration directory:
//! - **Linux**: `~/.config/measure-rs/`
//! - **macOS**: `~/Library/Application Support/measure-rs/`
//! - **Windows**: `%APPDATA%\measure-rs\`
//!
//! # Example
//!
//! ```toml
//! data_dir = "/home/lab/data"
//! delimiter = "\t"
//! poll_interval_ms = 100
//! plotting = true
//!
//! [plot]
//! line = true
//! legend = true
//! flow_width = 30.0
//!
//! [log]
//! directory = "/home/lab/logs"
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{MeasureError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for configuration directories
pub const APP_ID: &str = "measure-rs";

/// Session config filename
pub const SESSION_CONFIG_FILE: &str = "session.toml";

/// Default field delimiter for data records
pub const DEFAULT_DELIMITER: &str = ",";

/// Default command listener poll interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Extension given to data files created by the session
pub const DATA_FILE_EXTENSION: &str = "txt";

/// Get the application config directory path
pub fn app_config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path to the default session config file
pub fn session_config_path() -> Option<PathBuf> {
    app_config_dir().map(|p| p.join(SESSION_CONFIG_FILE))
}

/// Default directory for data files: the user's documents, else the cwd
pub fn default_data_dir() -> PathBuf {
    dirs_next::document_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Date/time text used as the default data file name
pub fn date_text() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Log output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory for daily log files; stderr only when unset
    pub directory: Option<PathBuf>,

    /// Filter directive used when `RUST_LOG` is not set
    pub filter: Option<String>,
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory offered by the file chooser
    pub data_dir: PathBuf,

    /// Data file to create at session start; asks the operator when unset
    pub output_file: Option<PathBuf>,

    /// Field delimiter for saved records
    pub delimiter: String,

    /// Command listener poll interval in milliseconds
    pub poll_interval_ms: u64,

    /// Whether to open a plot window
    pub plotting: bool,

    /// Plot window options
    pub plot: PlotOptions,

    /// Logging
    pub log: LogConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_file: None,
            delimiter: DEFAULT_DELIMITER.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            plotting: true,
            plot: PlotOptions::default(),
            log: LogConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load a config file from disk and validate it
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            MeasureError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            MeasureError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, returning defaults on any error
    pub fn load_or_default() -> Self {
        let Some(path) = session_config_path().filter(|p| p.exists()) else {
            return Self::default();
        };
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load session config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config file to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                MeasureError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| MeasureError::Config(format!("Failed to write config file: {}", e)))
    }

    /// Check values that the type system cannot
    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            return Err(MeasureError::Config("delimiter must not be empty".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(MeasureError::Config(
                "poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        self.plot
            .check()
            .map_err(|e| MeasureError::Config(format!("plot: {}", e)))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
