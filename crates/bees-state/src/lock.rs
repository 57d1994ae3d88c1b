//! Advisory lock serializing activations against one project directory.
//!
//! The lock is a file created with `create_new`, so exactly one holder can
//! exist at a time. It records the owner's pid and is removed when the
//! guard drops. A crashed holder leaves the file behind; it has to be
//! deleted by hand.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{StateError, StateResult};

/// File name of the hive lock.
pub const LOCK_FILE: &str = "current_hive.lock";

/// Held lock; the file is removed on drop.
#[derive(Debug)]
pub struct HiveLock {
    path: PathBuf,
}

impl HiveLock {
    /// Take the lock at `path`, failing with [`StateError::Locked`] if it
    /// is already held.
    pub fn acquire(path: &Path) -> StateResult<Self> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let owner = fs::read_to_string(path).unwrap_or_default();
                return Err(StateError::Locked(format!(
                    "{} (owner pid {})",
                    path.display(),
                    owner.trim()
                )));
            }
            Err(e) => {
                return Err(StateError::Lock(format!("{}: {e}", path.display())));
            }
        };

        // The guard exists before the write so a failed write still cleans up.
        let lock = Self {
            path: path.to_path_buf(),
        };
        write!(file, "{}", std::process::id())
            .map_err(|e| StateError::Lock(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), "hive lock acquired");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for HiveLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "hive lock released"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to release hive lock"),
        }
    }
}
