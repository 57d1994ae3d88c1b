//! Request and response types for provider calls.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider-assigned instance identifier.
pub type InstanceId = String;

/// Lifecycle status of a single instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstanceStatus {
    Pending,
    Running,
    ShuttingDown,
    Terminated,
    Stopping,
    Stopped,
}

impl InstanceStatus {
    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    /// Statuses from which an instance will not reach `Running` on its own.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::ShuttingDown | Self::Terminated | Self::Stopping | Self::Stopped
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One instance as last reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub status: InstanceStatus,
}

/// A batch instance-creation request.
///
/// Always asks for exactly `count` instances (`min == max`); placement and
/// subnet are left to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub image_id: String,
    pub count: u32,
    pub key_name: String,
    pub security_groups: Vec<String>,
    pub instance_type: String,
}

impl LaunchRequest {
    pub fn min_count(&self) -> u32 {
        self.count
    }

    pub fn max_count(&self) -> u32 {
        self.count
    }
}

/// Handle for one batch request and the instances it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub instances: Vec<Instance>,
}

impl Reservation {
    /// Instance ids in the order the provider returned them.
    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|i| i.id.clone()).collect()
    }
}
