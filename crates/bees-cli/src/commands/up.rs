use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use tokio::sync::watch;
use tracing::warn;

use bees_cloud::{CloudFleetClient, SimulatedCloud};
use bees_core::ConfigStore;
use bees_state::HiveStore;
use bees_swarm::{Activation, Beekeeper, PollPolicy, SwarmError};

/// Providers the CLI can reserve instances from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    /// In-process provider; instances start pending and run on the next poll.
    Simulated,
}

pub async fn up(project_dir: &Path, provider: Provider, policy: PollPolicy) -> anyhow::Result<()> {
    let config = ConfigStore::open(project_dir)?;
    let hive = HiveStore::open(project_dir);
    let cloud = connect(provider, config.config().region());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, abandoning activation");
            let _ = shutdown_tx.send(true);
        }
    });

    let keeper = Beekeeper::new(config, hive, cloud)
        .with_policy(policy)
        .with_shutdown(shutdown_rx);

    match keeper.activate_swarm().await {
        Ok(Activation::Activated(hive)) => {
            println!("✓ The swarm assembled {} bees", hive.size());
            println!("  Reservation: {}", hive.reservation_id.as_deref().unwrap_or("-"));
            for id in &hive.bees_ids {
                println!("  {id}");
            }
            Ok(())
        }
        Ok(Activation::AlreadyActive(existing)) => {
            let size = existing.map(|h| h.size()).unwrap_or(0);
            println!("Hive is up already ({size} bees).");
            println!("  Tear it down, then run `bees forget` to clear the record.");
            Ok(())
        }
        Err(e) => {
            eprintln!("Activation failed: {e}");
            if leaves_instances(&e) {
                eprintln!("  Instances reserved before the failure were not terminated.");
            }
            Err(e.into())
        }
    }
}

fn connect(provider: Provider, region: &str) -> Arc<dyn CloudFleetClient> {
    match provider {
        Provider::Simulated => Arc::new(SimulatedCloud::new(region)),
    }
}

/// Whether the failure happened after a reservation may have been made.
fn leaves_instances(err: &SwarmError) -> bool {
    match err {
        SwarmError::ProvisioningTimeout { .. } | SwarmError::Cancelled => true,
        SwarmError::CloudApi { operation, .. } => *operation != "run_instances",
        _ => false,
    }
}
