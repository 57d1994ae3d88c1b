//! SimulatedCloud — scripted in-process provider.
//!
//! Each launched instance walks a status script: the n-th
//! `describe_instances` call that includes it reports `script[n - 1]`,
//! sticking on the last entry once the script runs out. Freshly created
//! instances report `pending`. Failures can be queued per operation, and
//! every call is counted so callers can assert on provider traffic.

use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::CloudFleetClient;
use crate::error::{CloudError, CloudResult};
use crate::types::{Instance, InstanceId, InstanceStatus, LaunchRequest, Reservation};

/// Number of calls made per provider operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub run_instances: u32,
    pub describe_instances: u32,
    pub create_tags: u32,
}

impl CallCounts {
    pub fn total(&self) -> u32 {
        self.run_instances + self.describe_instances + self.create_tags
    }
}

struct SimInstance {
    id: InstanceId,
    script: Vec<InstanceStatus>,
    polls: usize,
}

impl SimInstance {
    fn status(&self) -> InstanceStatus {
        if self.polls == 0 {
            return InstanceStatus::Pending;
        }
        let idx = (self.polls - 1).min(self.script.len().saturating_sub(1));
        self.script
            .get(idx)
            .copied()
            .unwrap_or(InstanceStatus::Pending)
    }

    fn snapshot(&self) -> Instance {
        Instance {
            id: self.id.clone(),
            status: self.status(),
        }
    }
}

struct SimState {
    default_script: Vec<InstanceStatus>,
    /// Overrides keyed by launch order across all reservations.
    scripts: HashMap<usize, Vec<InstanceStatus>>,
    grant_limit: Option<u32>,
    run_failure: Option<CloudError>,
    describe_failures: VecDeque<CloudError>,
    tag_failures: VecDeque<CloudError>,
    instances: Vec<SimInstance>,
    reservations: u32,
    requests: Vec<LaunchRequest>,
    calls: CallCounts,
    tags: HashMap<InstanceId, BTreeMap<String, String>>,
    tag_writes: HashMap<InstanceId, u32>,
}

/// In-memory [`CloudFleetClient`].
pub struct SimulatedCloud {
    region: String,
    state: Mutex<SimState>,
}

impl SimulatedCloud {
    /// Instances report `pending` on their first describe, `running` after.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            state: Mutex::new(SimState {
                default_script: vec![InstanceStatus::Pending, InstanceStatus::Running],
                scripts: HashMap::new(),
                grant_limit: None,
                run_failure: None,
                describe_failures: VecDeque::new(),
                tag_failures: VecDeque::new(),
                instances: Vec::new(),
                reservations: 0,
                requests: Vec::new(),
                calls: CallCounts::default(),
                tags: HashMap::new(),
                tag_writes: HashMap::new(),
            }),
        }
    }

    /// Script used by every instance without an override.
    pub fn with_status_script(mut self, script: Vec<InstanceStatus>) -> Self {
        self.state.get_mut().default_script = script;
        self
    }

    /// Script for the instance launched at position `index` (0-based).
    pub fn with_instance_script(mut self, index: usize, script: Vec<InstanceStatus>) -> Self {
        self.state.get_mut().scripts.insert(index, script);
        self
    }

    /// Grant at most `limit` instances per request.
    pub fn with_grant_limit(mut self, limit: u32) -> Self {
        self.state.get_mut().grant_limit = Some(limit);
        self
    }

    /// Fail every `run_instances` call with `error`.
    pub fn with_run_failure(mut self, error: CloudError) -> Self {
        self.state.get_mut().run_failure = Some(error);
        self
    }

    /// Fail the next `describe_instances` calls, one error per call.
    pub fn with_describe_failures(mut self, errors: Vec<CloudError>) -> Self {
        self.state.get_mut().describe_failures.extend(errors);
        self
    }

    /// Fail the next `create_tags` calls, one error per call.
    pub fn with_tag_failures(mut self, errors: Vec<CloudError>) -> Self {
        self.state.get_mut().tag_failures.extend(errors);
        self
    }

    pub async fn calls(&self) -> CallCounts {
        self.state.lock().await.calls
    }

    /// Every launch request received, in order.
    pub async fn requests(&self) -> Vec<LaunchRequest> {
        self.state.lock().await.requests.clone()
    }

    pub async fn tags_for(&self, id: &str) -> Option<BTreeMap<String, String>> {
        self.state.lock().await.tags.get(id).cloned()
    }

    /// How many successful `create_tags` calls included `id`.
    pub async fn tag_writes(&self, id: &str) -> u32 {
        self.state
            .lock()
            .await
            .tag_writes
            .get(id)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl CloudFleetClient for SimulatedCloud {
    fn region(&self) -> &str {
        &self.region
    }

    async fn run_instances(&self, request: &LaunchRequest) -> CloudResult<Reservation> {
        let mut state = self.state.lock().await;
        state.calls.run_instances += 1;
        state.requests.push(request.clone());
        if let Some(err) = state.run_failure.clone() {
            return Err(err);
        }

        let granted = match state.grant_limit {
            Some(limit) => request.count.min(limit),
            None => request.count,
        };

        state.reservations += 1;
        let reservation_id = format!("r-{:08x}", state.reservations);
        let mut instances = Vec::with_capacity(granted as usize);
        for _ in 0..granted {
            let index = state.instances.len();
            let script = state
                .scripts
                .get(&index)
                .cloned()
                .unwrap_or_else(|| state.default_script.clone());
            let sim = SimInstance {
                id: format!("i-{:08x}", index + 1),
                script,
                polls: 0,
            };
            instances.push(sim.snapshot());
            state.instances.push(sim);
        }

        debug!(
            region = %self.region,
            reservation = %reservation_id,
            requested = request.count,
            granted,
            "simulated reservation created"
        );
        Ok(Reservation {
            id: reservation_id,
            instances,
        })
    }

    async fn describe_instances(&self, ids: &[InstanceId]) -> CloudResult<Vec<Instance>> {
        let mut state = self.state.lock().await;
        state.calls.describe_instances += 1;
        if let Some(err) = state.describe_failures.pop_front() {
            return Err(err);
        }

        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let sim = state
                .instances
                .iter_mut()
                .find(|sim| &sim.id == id)
                .ok_or_else(|| CloudError::UnknownInstance(id.clone()))?;
            sim.polls += 1;
            out.push(sim.snapshot());
        }
        Ok(out)
    }

    async fn create_tags(
        &self,
        ids: &[InstanceId],
        tags: &BTreeMap<String, String>,
    ) -> CloudResult<()> {
        let mut state = self.state.lock().await;
        state.calls.create_tags += 1;
        if let Some(err) = state.tag_failures.pop_front() {
            return Err(err);
        }

        if let Some(unknown) = ids
            .iter()
            .find(|id| !state.instances.iter().any(|sim| &sim.id == *id))
        {
            return Err(CloudError::UnknownInstance(unknown.clone()));
        }
        for id in ids {
            state
                .tags
                .entry(id.clone())
                .or_default()
                .extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
            *state.tag_writes.entry(id.clone()).or_insert(0) += 1;
        }
        Ok(())
    }
}
