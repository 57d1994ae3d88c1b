//! bees-cloud — the provider seam for swarm activation.
//!
//! [`CloudFleetClient`] is the only thing the activation logic knows about
//! a cloud: create a batch of instances, read their status, tag them.
//! [`SimulatedCloud`] is an in-process implementation with scripted
//! status transitions, used by tests and by `bees up --provider simulated`.

pub mod client;
pub mod error;
pub mod sim;
pub mod types;

pub use client::CloudFleetClient;
pub use error::{CloudError, CloudResult};
pub use sim::{CallCounts, SimulatedCloud};
pub use types::*;
