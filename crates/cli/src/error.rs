//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Input line that is not `<stream_id> <value>`
    #[error("line {line}: {message}")]
    InvalidLine { line: usize, message: String },

    /// `--stream-defaults` is not a JSON object
    #[error("Invalid stream defaults: {message}")]
    InvalidStreamDefaults { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_line(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidLine {
            line,
            message: message.into(),
        }
    }

    pub fn invalid_stream_defaults(message: impl Into<String>) -> Self {
        Self::InvalidStreamDefaults {
            message: message.into(),
        }
    }
}
