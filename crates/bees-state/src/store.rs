//! HiveStore — the hive record for one project directory.

use std::path::{Path, PathBuf};

use bees_core::JsonDocument;
use tracing::{debug, info};

use crate::error::StateResult;
use crate::hive::{HIVE_FILE, Hive};
use crate::lock::{HiveLock, LOCK_FILE};

/// Reads and writes `current_hive.json`; hands out the activation lock.
#[derive(Debug, Clone)]
pub struct HiveStore {
    document: JsonDocument,
    lock_path: PathBuf,
}

impl HiveStore {
    pub fn open(project_dir: &Path) -> Self {
        Self {
            document: JsonDocument::new(project_dir, HIVE_FILE),
            lock_path: project_dir.join(LOCK_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    /// Whether a swarm is currently recorded as active.
    pub fn is_active(&self) -> bool {
        self.document.exists()
    }

    /// The recorded hive, or `None` when no swarm is active.
    pub fn load(&self) -> StateResult<Option<Hive>> {
        Ok(self.document.load()?)
    }

    /// Persist `hive`, marking the swarm active.
    pub fn activate(&self, hive: &Hive) -> StateResult<()> {
        self.document.save(hive)?;
        info!(
            path = %self.path().display(),
            bees = hive.size(),
            reservation = hive.reservation_id.as_deref().unwrap_or("-"),
            "hive recorded"
        );
        Ok(())
    }

    /// Delete the record after the swarm was torn down elsewhere.
    /// Returns true if a record existed.
    pub fn clear(&self) -> StateResult<bool> {
        let existed = self.document.remove()?;
        debug!(path = %self.path().display(), existed, "hive record cleared");
        Ok(existed)
    }

    /// Take the single-writer activation lock.
    pub fn lock(&self) -> StateResult<HiveLock> {
        HiveLock::acquire(&self.lock_path)
    }
}
