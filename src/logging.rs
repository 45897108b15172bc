//! Tracing subscriber setup
//!
//! Diagnostics go to stderr. When a log directory is configured a second,
//! non-blocking layer writes a daily rolling file there as well.

use crate::config::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when neither `RUST_LOG` nor the config provides one
pub const DEFAULT_FILTER: &str = "info,measure_rs=debug";

/// Prefix of the daily log files
pub const LOG_FILE_PREFIX: &str = "measure-rs.log";

fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.filter.as_deref().unwrap_or(DEFAULT_FILTER))
    })
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for as long as logging is needed. Installing twice is harmless;
/// the second call keeps the existing subscriber.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(env_filter(config));

    let (file_layer, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_writer(writer)
                .with_filter(env_filter(config));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
    {
        tracing::debug!("Tracing subscriber already installed: {}", e);
    }

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_with_directory_returns_guard() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            directory: Some(dir.path().to_path_buf()),
            filter: Some("debug".to_string()),
        };
        let guard = init(&config);
        assert!(guard.is_some());
        tracing::info!("log file test");
        drop(guard);
    }

    #[test]
    fn test_init_without_directory() {
        assert!(init(&LogConfig::default()).is_none());
    }
}
