//! The provider trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::CloudResult;
use crate::types::{Instance, InstanceId, LaunchRequest, Reservation};

/// Minimal provider surface needed to raise a swarm.
///
/// Implementations are bound to a single region.
#[async_trait]
pub trait CloudFleetClient: Send + Sync {
    /// Region this client talks to.
    fn region(&self) -> &str;

    /// Create `request.count` instances in one call.
    ///
    /// The provider may grant fewer than requested; callers find out by
    /// looking at the returned reservation.
    async fn run_instances(&self, request: &LaunchRequest) -> CloudResult<Reservation>;

    /// Fresh status for each of `ids`, in the same order.
    async fn describe_instances(&self, ids: &[InstanceId]) -> CloudResult<Vec<Instance>>;

    /// Attach `tags` to every instance in `ids`.
    async fn create_tags(
        &self,
        ids: &[InstanceId],
        tags: &BTreeMap<String, String>,
    ) -> CloudResult<()>;
}
