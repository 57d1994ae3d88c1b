//! JsonDocument — a named JSON file living in the project directory.
//!
//! Both the project config and the hive record are stored this way.
//! Saves go through a sibling temp file and a rename, so a reader never
//! observes a half-written document and repeated saves overwrite.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// A JSON document at `<dir>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonDocument {
    path: PathBuf,
}

impl JsonDocument {
    /// Point at `name` inside `dir`. Nothing is read or created.
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the document, or `None` if the file does not exist.
    pub fn load<T: DeserializeOwned>(&self) -> ConfigResult<Option<T>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ConfigError::Read {
                    path: self.display(),
                    message: e.to_string(),
                });
            }
        };
        let value = serde_json::from_slice(&raw).map_err(|e| ConfigError::Parse {
            path: self.display(),
            message: e.to_string(),
        })?;
        debug!(path = %self.path.display(), "document loaded");
        Ok(Some(value))
    }

    /// Load the document, falling back to `T::default()` when absent.
    ///
    /// Field-level overlay (file values win, missing fields keep their
    /// defaults) comes from `#[serde(default)]` on `T`.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self) -> ConfigResult<T> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Serialize `value` as pretty JSON, replacing any previous content.
    pub fn save<T: Serialize>(&self, value: &T) -> ConfigResult<()> {
        let mut body =
            serde_json::to_vec_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        body.push(b'\n');

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &body).map_err(|e| self.write_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.write_error(e))?;
        debug!(path = %self.path.display(), bytes = body.len(), "document saved");
        Ok(())
    }

    /// Delete the document. Returns true if it existed.
    pub fn remove(&self) -> ConfigResult<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.write_error(e)),
        }
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }

    fn write_error(&self, e: std::io::Error) -> ConfigError {
        ConfigError::Write {
            path: self.display(),
            message: e.to_string(),
        }
    }
}
