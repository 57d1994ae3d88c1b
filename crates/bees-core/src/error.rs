//! Error types for config and document I/O.

use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while reading, writing, or validating config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read error for {path}: {message}")]
    Read { path: String, message: String },

    #[error("write error for {path}: {message}")]
    Write { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}
