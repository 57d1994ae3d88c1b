//! Error types for the hive store.

use thiserror::Error;

/// Result type alias for hive store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while reading or writing fleet state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Document(#[from] bees_core::ConfigError),

    #[error("hive is locked by another activation: {0}")]
    Locked(String),

    #[error("lock error: {0}")]
    Lock(String),
}
