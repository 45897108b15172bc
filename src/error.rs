//! Error handling for measure-rs
//!
//! This module defines the error type shared by every component and a
//! Result alias for use throughout the crate.

use thiserror::Error;

/// Main error type for measure-rs operations
#[derive(Error, Debug)]
pub enum MeasureError {
    /// Data file errors: path collisions, writes or closes without a file
    #[error("File error: {0}")]
    File(String),

    /// Errors related to configuration loading/saving and option validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Misuse of the plot relay (invalid options, double start, ...)
    #[error("Plot agent error: {0}")]
    PlotAgent(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MeasureError>,
    },
}

impl MeasureError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        MeasureError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any context wrappers
    pub fn root(&self) -> &MeasureError {
        match self {
            MeasureError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for MeasureError {
    fn from(err: serde_json::Error) -> Self {
        MeasureError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MeasureError {
    fn from(err: toml::de::Error) -> Self {
        MeasureError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for MeasureError {
    fn from(err: toml::ser::Error) -> Self {
        MeasureError::Serialization(err.to_string())
    }
}

/// Result type alias for measure-rs operations
pub type Result<T> = std::result::Result<T, MeasureError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| MeasureError::Io(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| MeasureError::Io(e).with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MeasureError::File("no file has been opened".to_string());
        assert_eq!(err.to_string(), "File error: no file has been opened");
    }

    #[test]
    fn test_error_with_context() {
        let err = MeasureError::PlotAgent("flow_width must be >= 0".to_string());
        let with_ctx = err.with_context("Failed to configure plot");
        assert!(with_ctx.to_string().contains("Failed to configure plot"));
        assert!(matches!(with_ctx.root(), MeasureError::PlotAgent(_)));
    }

    #[test]
    fn test_io_context() {
        let res: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "exists",
        ));
        let err = res.context("creating data file").unwrap_err();
        assert!(err.to_string().starts_with("creating data file"));
        assert!(matches!(err.root(), MeasureError::Io(_)));
    }
}
