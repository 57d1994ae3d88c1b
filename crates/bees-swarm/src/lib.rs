//! bees-swarm — swarm activation.
//!
//! The [`Beekeeper`] raises a swarm of load-generating instances and
//! records it as the active hive:
//!
//! - refuses to act when a hive is already recorded
//! - checks that the SSH key for the region exists
//! - reserves exactly `numberOfBees` instances in one request
//! - polls until all of them run, within a [`PollPolicy`]
//! - tags the bees and writes the hive record (the commit point)
//!
//! # Architecture
//!
//! ```text
//! Beekeeper
//!   ├── ConfigStore      (launch parameters, key path)
//!   ├── HiveStore        (guard, lock, commit)
//!   ├── CloudFleetClient (run / describe / tag)
//!   └── PollPolicy + ReadinessTracker
//! ```
//!
//! Nothing is rolled back on failure: instances created before an error
//! stay up and must be torn down by other tooling.

pub mod controller;
pub mod error;
pub mod poll;
pub mod retry;

pub use controller::{Activation, Beekeeper, BEE_TAG_KEY, BEE_TAG_VALUE};
pub use error::{SwarmError, SwarmResult, TimeoutReason};
pub use poll::{PollPolicy, ReadinessTracker};
