//! Beekeeper — the swarm activation state machine.
//!
//! ```text
//! guard ──active──▶ AlreadyActive
//!   │
//!   ▼
//! lock ─▶ re-check guard ─▶ key check ─▶ reserve ─▶ poll ─▶ tag ─▶ record hive
//! ```
//!
//! Every step before "record hive" can fail; none of them writes state.
//! Provider calls race the activation deadline and the shutdown signal, so
//! a call that never returns still ends in a timeout or a cancellation.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bees_cloud::{CloudFleetClient, InstanceId, LaunchRequest, Reservation};
use bees_core::{ConfigError, ConfigStore};
use bees_state::{Hive, HiveStore};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{SwarmError, SwarmResult, TimeoutReason};
use crate::poll::{PollPolicy, ReadinessTracker, running_ids};
use crate::retry::with_retries;

pub const BEE_TAG_KEY: &str = "Name";
pub const BEE_TAG_VALUE: &str = "a bee!";

const TAG_ATTEMPTS: u32 = 3;

/// Outcome of [`Beekeeper::activate_swarm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// A hive was already recorded; nothing was done. The record is
    /// `None` when it exists but cannot be read.
    AlreadyActive(Option<Hive>),
    /// A new swarm was raised and recorded.
    Activated(Hive),
}

/// Raises a swarm and records it as the active hive.
pub struct Beekeeper {
    config: ConfigStore,
    hive: HiveStore,
    cloud: Arc<dyn CloudFleetClient>,
    policy: PollPolicy,
    username: String,
    shutdown: Option<watch::Receiver<bool>>,
}

impl Beekeeper {
    pub fn new(config: ConfigStore, hive: HiveStore, cloud: Arc<dyn CloudFleetClient>) -> Self {
        Self {
            config,
            hive,
            cloud,
            policy: PollPolicy::default(),
            username: current_username(),
            shutdown: None,
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Abort polling once `shutdown` turns `true`.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn hive_store(&self) -> &HiveStore {
        &self.hive
    }

    /// Raise the configured swarm unless one is already recorded.
    pub async fn activate_swarm(&self) -> SwarmResult<Activation> {
        if let Some(existing) = self.already_active() {
            return Ok(existing);
        }

        let _lock = self.hive.lock()?;
        // Another activation may have committed between the guard and the lock.
        if let Some(existing) = self.already_active() {
            return Ok(existing);
        }

        let config = self.config.config();
        config.validate()?;
        if config.region() != self.cloud.region() {
            return Err(ConfigError::Invalid(format!(
                "zone {} is outside the client region {}",
                config.zone,
                self.cloud.region()
            ))
            .into());
        }

        let deadline_at = Instant::now() + self.policy.deadline;
        let reservation = self.reserve_before(deadline_at).await?;
        let (bees, attempts) = self.wait_for_bees(&reservation, deadline_at).await?;
        self.tag_bees(&bees, attempts, deadline_at).await?;

        let hive = Hive::new(&self.username, &config.zone, bees, reservation.id.clone());
        self.hive.activate(&hive)?;
        info!(
            bees = hive.size(),
            reservation = %reservation.id,
            "the swarm assembled"
        );
        Ok(Activation::Activated(hive))
    }

    /// Request exactly `numberOfBees` instances in a single call.
    ///
    /// Fails with [`SwarmError::MissingCredential`] before touching the
    /// provider when no key file is found. A short grant is returned as-is.
    /// The call is bounded by the policy deadline.
    pub async fn reserve_swarm(&self) -> SwarmResult<Reservation> {
        self.reserve_before(Instant::now() + self.policy.deadline).await
    }

    async fn reserve_before(&self, deadline_at: Instant) -> SwarmResult<Reservation> {
        self.require_key_path()?;

        let request = self.launch_request();
        info!(
            bees = request.count,
            region = %self.cloud.region(),
            image = %request.image_id,
            instance_type = %request.instance_type,
            "attempting to call up bees"
        );
        let reservation = self
            .bounded(deadline_at, self.cloud.run_instances(&request))
            .await
            .map_err(|interrupt| interrupt.into_error(0, request.count, 0))?
            .map_err(|source| SwarmError::CloudApi {
                operation: "run_instances",
                source,
            })?;

        let granted = reservation.instances.len();
        if granted < request.count as usize {
            warn!(
                reservation = %reservation.id,
                granted,
                requested = request.count,
                "provider granted fewer bees than requested"
            );
        } else {
            debug!(reservation = %reservation.id, granted, "reservation created");
        }
        Ok(reservation)
    }

    /// Launch parameters derived from the project config.
    pub fn launch_request(&self) -> LaunchRequest {
        let config = self.config.config();
        LaunchRequest {
            image_id: config.instance_id.clone(),
            count: config.number_of_bees,
            key_name: config.key_name(),
            security_groups: vec![config.security_group.clone()],
            instance_type: config.instance_type.clone(),
        }
    }

    /// Ids in `reservation` that are running right now (fresh query).
    pub async fn active_bees_ids(&self, reservation: &Reservation) -> SwarmResult<Vec<InstanceId>> {
        let instances = self
            .cloud
            .describe_instances(&reservation.instance_ids())
            .await
            .map_err(|source| SwarmError::CloudApi {
                operation: "describe_instances",
                source,
            })?;
        Ok(running_ids(&instances))
    }

    /// Whether every requested bee is running right now.
    pub async fn swarm_is_active(&self, reservation: &Reservation) -> SwarmResult<bool> {
        let running = self.active_bees_ids(reservation).await?;
        Ok(running.len() == self.config.config().number_of_bees as usize)
    }

    fn already_active(&self) -> Option<Activation> {
        if !self.hive.is_active() {
            return None;
        }
        let existing = match self.hive.load() {
            Ok(hive) => hive,
            Err(e) => {
                warn!(path = %self.hive.path().display(), error = %e, "hive record unreadable");
                None
            }
        };
        warn!(
            path = %self.hive.path().display(),
            hive = ?existing,
            "hive is up already"
        );
        Some(Activation::AlreadyActive(existing))
    }

    fn require_key_path(&self) -> SwarmResult<&Path> {
        self.config.key_path().ok_or_else(|| {
            let config = self.config.config();
            SwarmError::MissingCredential {
                key_name: config.key_name(),
                searched: self
                    .config
                    .key_resolver()
                    .candidates(&config.key_file_name()),
            }
        })
    }

    /// Poll until every requested bee runs, or the policy gives up.
    ///
    /// Returns the running ids and the number of polls it took.
    async fn wait_for_bees(
        &self,
        reservation: &Reservation,
        deadline_at: Instant,
    ) -> SwarmResult<(Vec<InstanceId>, u32)> {
        let requested = self.config.config().number_of_bees;
        let ids = reservation.instance_ids();
        let policy = &self.policy;
        let timeout = |reason, running, attempts| SwarmError::ProvisioningTimeout {
            running,
            requested,
            attempts,
            reason,
        };

        if ids.len() < requested as usize {
            return Err(timeout(
                TimeoutReason::PartialGrant { granted: ids.len() },
                0,
                0,
            ));
        }

        let started = Instant::now();
        let mut tracker = ReadinessTracker::new();
        let mut shutdown = self.shutdown.clone();
        let mut api_errors = 0;
        let mut attempt = 0;

        loop {
            attempt += 1;
            if is_cancelled(&shutdown) {
                return Err(SwarmError::Cancelled);
            }

            let polled = self
                .bounded(deadline_at, self.cloud.describe_instances(&ids))
                .await
                .map_err(|interrupt| {
                    interrupt.into_error(tracker.ready_count(), requested, attempt)
                })?;
            match polled {
                Ok(instances) => {
                    if let Some(lost) = instances.iter().find(|i| i.status.is_terminal()) {
                        return Err(timeout(
                            TimeoutReason::InstanceLost {
                                id: lost.id.clone(),
                                status: lost.status,
                            },
                            tracker.ready_count(),
                            attempt,
                        ));
                    }
                    tracker.observe(&instances);
                    let running = running_ids(&instances);
                    if running.len() == requested as usize {
                        debug!(attempt, elapsed = ?started.elapsed(), "all bees running");
                        return Ok((running, attempt));
                    }
                    info!(
                        ready = tracker.ready_count(),
                        requested,
                        attempt,
                        "waiting for bees to load their machine guns"
                    );
                }
                Err(e) if e.is_retryable() => {
                    api_errors += 1;
                    warn!(attempt, api_errors, error = %e, "status poll failed");
                    if api_errors > policy.max_api_errors {
                        return Err(timeout(
                            TimeoutReason::ApiErrors(e.to_string()),
                            tracker.ready_count(),
                            attempt,
                        ));
                    }
                }
                Err(source) => {
                    return Err(SwarmError::CloudApi {
                        operation: "describe_instances",
                        source,
                    });
                }
            }

            if attempt >= policy.max_attempts {
                return Err(timeout(
                    TimeoutReason::AttemptsExhausted,
                    tracker.ready_count(),
                    attempt,
                ));
            }
            let remaining = deadline_at.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(timeout(
                    TimeoutReason::Deadline,
                    tracker.ready_count(),
                    attempt,
                ));
            }
            let delay = policy.interval.min(remaining);
            pause(&mut shutdown, delay).await?;
        }
    }

    async fn tag_bees(
        &self,
        ids: &[InstanceId],
        attempts: u32,
        deadline_at: Instant,
    ) -> SwarmResult<()> {
        let tags = BTreeMap::from([(BEE_TAG_KEY.to_string(), BEE_TAG_VALUE.to_string())]);
        let tagging = with_retries("create_tags", TAG_ATTEMPTS, self.policy.interval, || {
            self.cloud.create_tags(ids, &tags)
        });
        self.bounded(deadline_at, tagging)
            .await
            .map_err(|interrupt| {
                interrupt.into_error(ids.len(), self.config.config().number_of_bees, attempts)
            })?
            .map_err(|source| SwarmError::CloudApi {
                operation: "create_tags",
                source,
            })?;
        debug!(bees = ids.len(), "bees tagged");
        Ok(())
    }

    /// Run `call` until it finishes, `deadline_at` passes, or shutdown is
    /// signalled, whichever comes first.
    async fn bounded<T>(
        &self,
        deadline_at: Instant,
        call: impl Future<Output = T>,
    ) -> Result<T, Interrupt> {
        let call = tokio::time::timeout_at(deadline_at, call);
        let mut shutdown = self.shutdown.clone();
        match shutdown.as_mut() {
            None => call.await.map_err(|_| Interrupt::Deadline),
            Some(rx) => tokio::select! {
                biased;
                _ = shutdown_requested(rx) => Err(Interrupt::Cancelled),
                result = call => result.map_err(|_| Interrupt::Deadline),
            },
        }
    }
}

/// Why a provider call was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    Deadline,
    Cancelled,
}

impl Interrupt {
    fn into_error(self, running: usize, requested: u32, attempts: u32) -> SwarmError {
        match self {
            Interrupt::Deadline => SwarmError::ProvisioningTimeout {
                running,
                requested,
                attempts,
                reason: TimeoutReason::Deadline,
            },
            Interrupt::Cancelled => SwarmError::Cancelled,
        }
    }
}

fn is_cancelled(shutdown: &Option<watch::Receiver<bool>>) -> bool {
    shutdown.as_ref().is_some_and(|rx| *rx.borrow())
}

/// Resolves once the shutdown flag reads `true`. Never resolves if the
/// sender goes away first.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Sleep for `delay`, waking early if the shutdown signal changes.
async fn pause(shutdown: &mut Option<watch::Receiver<bool>>, delay: Duration) -> SwarmResult<()> {
    let Some(rx) = shutdown.as_mut() else {
        tokio::time::sleep(delay).await;
        return Ok(());
    };

    let changed = tokio::select! {
        _ = tokio::time::sleep(delay) => None,
        changed = rx.changed() => Some(changed.is_ok()),
    };
    match changed {
        None => Ok(()),
        Some(true) if *rx.borrow() => Err(SwarmError::Cancelled),
        Some(true) => Ok(()),
        Some(false) => {
            // Sender dropped: nobody can cancel any more.
            *shutdown = None;
            tokio::time::sleep(delay).await;
            Ok(())
        }
    }
}

fn current_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}
