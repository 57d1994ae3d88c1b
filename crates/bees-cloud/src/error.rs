//! Cloud provider error types.

use thiserror::Error;

/// Result type alias for provider calls.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors a provider call can surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloudError {
    /// Transient failure (network, 5xx).
    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },

    #[error("{0} was throttled")]
    Throttled(String),

    /// The provider refused the request; retrying will not help.
    #[error("{operation} rejected: {message}")]
    Rejected { operation: String, message: String },

    #[error("unknown instance: {0}")]
    UnknownInstance(String),
}

impl CloudError {
    pub fn api(operation: &str, message: impl Into<String>) -> Self {
        Self::Api {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    pub fn rejected(operation: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.to_string(),
            message: message.into(),
        }
    }

    /// Whether the same call may succeed if repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api { .. } | Self::Throttled(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(CloudError::api("describe_instances", "timeout").is_retryable());
        assert!(CloudError::Throttled("create_tags".into()).is_retryable());
        assert!(!CloudError::rejected("run_instances", "bad ami").is_retryable());
        assert!(!CloudError::UnknownInstance("i-1".into()).is_retryable());
    }
}
