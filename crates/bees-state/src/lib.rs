//! bees-state — persisted record of the currently active swarm.
//!
//! The hive record (`current_hive.json`) is written once, at the end of a
//! successful activation. Its existence is the only "swarm is active" flag;
//! teardown tooling deletes it.
//!
//! # Architecture
//!
//! ```text
//! HiveStore
//!   ├── JsonDocument  current_hive.json   (Hive: user, zone, bee ids, reservation)
//!   └── HiveLock      current_hive.lock   (single-writer guard, removed on drop)
//! ```

pub mod error;
pub mod hive;
pub mod lock;
pub mod store;

pub use error::{StateError, StateResult};
pub use hive::Hive;
pub use lock::HiveLock;
pub use store::HiveStore;
