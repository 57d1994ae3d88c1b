//! bees-core — shared configuration types for the bees swarm tooling.
//!
//! Holds everything that is plain project-local I/O:
//!
//! - [`ProjectConfig`]: launch parameters read from `beesconfig.json`,
//!   with compile-time defaults for every field
//! - [`ConfigStore`]: loads/saves the config and lazily resolves the
//!   SSH key path
//! - [`KeyResolver`]: ordered candidate-directory lookup for key files
//! - [`JsonDocument`]: a named JSON file in the project directory
//! - [`inspect::debug_dump`]: structured debug rendering of any
//!   serializable value

pub mod config;
pub mod document;
pub mod error;
pub mod inspect;
pub mod keys;

pub use config::{ConfigStore, ProjectConfig, region_from_zone};
pub use document::JsonDocument;
pub use error::{ConfigError, ConfigResult};
pub use keys::{KeyResolver, home_dir};
