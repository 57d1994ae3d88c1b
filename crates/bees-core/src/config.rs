//! Project configuration (`beesconfig.json`).
//!
//! Every field has a compile-time default; a config file in the project
//! directory overrides whichever fields it names. The key name and region
//! are derived from the zone rather than stored.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::JsonDocument;
use crate::error::{ConfigError, ConfigResult};
use crate::keys::KeyResolver;

/// File name of the project config document.
pub const CONFIG_FILE: &str = "beesconfig.json";

pub const KEY_NAME_PREFIX: &str = "aws-ec2";
pub const KEY_EXT: &str = "pem";

pub const DEFAULT_SECURITY_GROUP: &str = "default";
pub const DEFAULT_ZONE: &str = "us-east-1d";
pub const DEFAULT_INSTANCE_ID: &str = "ami-ff17fb96";
pub const DEFAULT_INSTANCE_TYPE: &str = "t1.micro";
pub const DEFAULT_NUMBER_OF_BEES: u32 = 10;

/// Launch parameters for a swarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    pub security_group: String,
    /// Availability zone, e.g. `us-east-1d`.
    pub zone: String,
    /// Machine image the bees boot from.
    pub instance_id: String,
    pub number_of_bees: u32,
    pub instance_type: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            security_group: DEFAULT_SECURITY_GROUP.to_string(),
            zone: DEFAULT_ZONE.to_string(),
            instance_id: DEFAULT_INSTANCE_ID.to_string(),
            number_of_bees: DEFAULT_NUMBER_OF_BEES,
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
        }
    }
}

impl ProjectConfig {
    /// Region = zone without its trailing letter.
    pub fn region(&self) -> &str {
        region_from_zone(&self.zone)
    }

    /// Name of the key pair registered with the provider for this region.
    pub fn key_name(&self) -> String {
        format!("{KEY_NAME_PREFIX}-{}", self.region())
    }

    /// File name the private key is expected under.
    pub fn key_file_name(&self) -> String {
        format!("{}.{KEY_EXT}", self.key_name())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.number_of_bees == 0 {
            return Err(ConfigError::Invalid(
                "numberOfBees must be at least 1".to_string(),
            ));
        }
        let ends_in_letter = self
            .zone
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphabetic());
        if !ends_in_letter || self.region().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "zone {:?} must be a region followed by a zone letter",
                self.zone
            )));
        }
        Ok(())
    }
}

/// Strip the trailing zone letter: `us-east-1d` → `us-east-1`.
pub fn region_from_zone(zone: &str) -> &str {
    match zone.char_indices().last() {
        Some((idx, _)) => &zone[..idx],
        None => zone,
    }
}

/// Loads, holds, and saves the project config for one project directory.
///
/// The key path is resolved on first access and cached until the config
/// is mutated through [`ConfigStore::config_mut`].
#[derive(Debug)]
pub struct ConfigStore {
    document: JsonDocument,
    config: ProjectConfig,
    keys: KeyResolver,
    key_path: OnceLock<Option<PathBuf>>,
}

impl ConfigStore {
    /// Load `beesconfig.json` from `project_dir`, overlaying it on defaults.
    pub fn open(project_dir: &Path) -> ConfigResult<Self> {
        let document = JsonDocument::new(project_dir, CONFIG_FILE);
        let config: ProjectConfig = document.load_or_default()?;
        debug!(
            path = %document.path().display(),
            from_file = document.exists(),
            zone = %config.zone,
            bees = config.number_of_bees,
            "project config loaded"
        );
        Ok(Self {
            document,
            config,
            keys: KeyResolver::new(KeyResolver::default_dirs(project_dir)),
            key_path: OnceLock::new(),
        })
    }

    /// Replace the key search directories.
    pub fn with_key_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.keys = KeyResolver::new(dirs);
        self.key_path = OnceLock::new();
        self
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Mutable access; drops the cached key path since the zone may change.
    pub fn config_mut(&mut self) -> &mut ProjectConfig {
        self.key_path = OnceLock::new();
        &mut self.config
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    pub fn key_resolver(&self) -> &KeyResolver {
        &self.keys
    }

    /// Write the in-memory config back to `beesconfig.json`.
    pub fn save_config(&self) -> ConfigResult<()> {
        self.document.save(&self.config)
    }

    /// Path of the key file for the configured region, if one exists.
    pub fn key_path(&self) -> Option<&Path> {
        self.key_path
            .get_or_init(|| {
                let file_name = self.config.key_file_name();
                let found = self.keys.resolve(&file_name);
                match &found {
                    Some(path) => debug!(path = %path.display(), "key found"),
                    None => warn!(
                        candidates = ?self.keys.candidates(&file_name),
                        "no key found"
                    ),
                }
                found
            })
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_drops_zone_letter() {
        assert_eq!(region_from_zone("us-east-1d"), "us-east-1");
        assert_eq!(region_from_zone("eu-west-1a"), "eu-west-1");
        assert_eq!(region_from_zone(""), "");
    }

    #[test]
    fn key_name_is_derived_from_region() {
        let config = ProjectConfig {
            zone: "eu-west-1a".to_string(),
            ..Default::default()
        };
        assert_eq!(config.key_name(), "aws-ec2-eu-west-1");
        assert_eq!(config.key_file_name(), "aws-ec2-eu-west-1.pem");
    }

    #[test]
    fn validate_rejects_empty_swarm_and_bad_zone() {
        let empty = ProjectConfig {
            number_of_bees: 0,
            ..Default::default()
        };
        assert!(matches!(empty.validate(), Err(ConfigError::Invalid(_))));

        let bad_zone = ProjectConfig {
            zone: "us-east-1".to_string(),
            ..Default::default()
        };
        assert!(bad_zone.validate().is_err());

        assert!(ProjectConfig::default().validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"zone": "eu-west-1a", "numberOfBees": 3}"#,
        )
        .unwrap();

        let store = ConfigStore::open(dir.path()).unwrap();
        assert_eq!(store.config().zone, "eu-west-1a");
        assert_eq!(store.config().number_of_bees, 3);
        assert_eq!(store.config().instance_type, DEFAULT_INSTANCE_TYPE);
        assert_eq!(store.config().security_group, DEFAULT_SECURITY_GROUP);
    }

    #[test]
    fn save_config_round_trips_through_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::open(dir.path()).unwrap();
        store.config_mut().instance_type = "c5.large".to_string();
        store.save_config().unwrap();
        store.save_config().unwrap();

        let reopened = ConfigStore::open(dir.path()).unwrap();
        assert_eq!(reopened.config().instance_type, "c5.large");
    }

    #[test]
    fn key_path_uses_configured_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path())
            .unwrap()
            .with_key_dirs(vec![dir.path().to_path_buf()]);
        assert_eq!(store.key_path(), None);

        let keys = tempfile::tempdir().unwrap();
        std::fs::write(keys.path().join("aws-ec2-us-east-1.pem"), "key").unwrap();
        let store = store.with_key_dirs(vec![keys.path().to_path_buf()]);
        assert_eq!(
            store.key_path(),
            Some(keys.path().join("aws-ec2-us-east-1.pem").as_path())
        );
    }

    #[test]
    fn changing_zone_re_resolves_key() {
        let keys = tempfile::tempdir().unwrap();
        std::fs::write(keys.path().join("aws-ec2-us-east-1.pem"), "key").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::open(dir.path())
            .unwrap()
            .with_key_dirs(vec![keys.path().to_path_buf()]);
        assert!(store.key_path().is_some());

        store.config_mut().zone = "eu-west-1a".to_string();
        assert!(store.key_path().is_none());
    }
}
