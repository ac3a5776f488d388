//! Error types for ringwatch.

use thiserror::Error;

/// Result type alias using `RingwatchError`.
pub type Result<T> = std::result::Result<T, RingwatchError>;

/// Errors that can occur while ingesting, analyzing or exporting a ledger.
#[derive(Debug, Error)]
pub enum RingwatchError {
    /// Input handed to the analysis engine violates its preconditions.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record could not be parsed by an ingestion adapter.
    #[error("Parse error at line {line}: {message}")]
    ParseError {
        /// 1-based line number in the source document.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RingwatchError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        RingwatchError::InvalidInput(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        RingwatchError::ConfigError(msg.into())
    }

    /// Create a parse error for a source line.
    #[must_use]
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        RingwatchError::ParseError {
            line,
            message: msg.into(),
        }
    }

    /// Returns true if the error was caused by the caller's data rather than the environment.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            RingwatchError::InvalidInput(_) | RingwatchError::ParseError { .. }
        )
    }
}
