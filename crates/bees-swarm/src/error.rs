//! Activation error types.

use std::fmt;
use std::path::PathBuf;

use bees_cloud::{CloudError, InstanceStatus};
use thiserror::Error;

/// Why polling gave up before the swarm was complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutReason {
    Deadline,
    AttemptsExhausted,
    /// Too many transient provider errors; carries the last one.
    ApiErrors(String),
    /// An instance entered a status it cannot recover from.
    InstanceLost { id: String, status: InstanceStatus },
    /// The provider granted fewer instances than requested.
    PartialGrant { granted: usize },
}

impl fmt::Display for TimeoutReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deadline => f.write_str("deadline expired"),
            Self::AttemptsExhausted => f.write_str("poll attempts exhausted"),
            Self::ApiErrors(last) => write!(f, "too many provider errors, last: {last}"),
            Self::InstanceLost { id, status } => write!(f, "instance {id} is {status}"),
            Self::PartialGrant { granted } => write!(f, "provider granted only {granted}"),
        }
    }
}

/// Errors that abort an activation. No hive is recorded for any of them.
#[derive(Debug, Error)]
pub enum SwarmError {
    #[error("key {key_name} not found in {searched:?}")]
    MissingCredential {
        key_name: String,
        searched: Vec<PathBuf>,
    },

    #[error("{running}/{requested} bees running after {attempts} polls: {reason}")]
    ProvisioningTimeout {
        running: usize,
        requested: u32,
        attempts: u32,
        reason: TimeoutReason,
    },

    #[error("cloud API error during {operation}: {source}")]
    CloudApi {
        operation: &'static str,
        #[source]
        source: CloudError,
    },

    #[error("activation cancelled")]
    Cancelled,

    #[error("config error: {0}")]
    Config(#[from] bees_core::ConfigError),

    #[error("state error: {0}")]
    State(#[from] bees_state::StateError),
}

pub type SwarmResult<T> = Result<T, SwarmError>;
