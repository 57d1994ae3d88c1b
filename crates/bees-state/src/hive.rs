//! The hive: identity of the active swarm.

use serde::{Deserialize, Serialize};

/// File name of the hive record.
pub const HIVE_FILE: &str = "current_hive.json";

/// Fleet identity persisted after a successful activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hive {
    /// Operator who activated the swarm.
    pub username: String,
    pub zone: String,
    /// Instance ids, in reservation order.
    pub bees_ids: Vec<String>,
    pub reservation_id: Option<String>,
}

impl Hive {
    pub fn new(
        username: impl Into<String>,
        zone: impl Into<String>,
        bees_ids: Vec<String>,
        reservation_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            zone: zone.into(),
            bees_ids,
            reservation_id: Some(reservation_id.into()),
        }
    }

    /// Number of bees in the swarm.
    pub fn size(&self) -> usize {
        self.bees_ids.len()
    }
}
