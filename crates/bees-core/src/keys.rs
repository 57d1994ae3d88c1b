//! Key file lookup across an ordered list of directories.

use std::path::{Path, PathBuf};

/// Resolves a key file name against candidate directories, first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyResolver {
    dirs: Vec<PathBuf>,
}

impl KeyResolver {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Project directory first, then `~/.ssh` when a home directory exists.
    pub fn default_dirs(project_dir: &Path) -> Vec<PathBuf> {
        let mut search = vec![project_dir.to_path_buf()];
        if let Some(home) = home_dir() {
            search.push(home.join(".ssh"));
        }
        search
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Every path that would be checked for `file_name`, in order.
    pub fn candidates(&self, file_name: &str) -> Vec<PathBuf> {
        self.dirs.iter().map(|dir| dir.join(file_name)).collect()
    }

    /// The first candidate that exists as a regular file.
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        self.candidates(file_name)
            .into_iter()
            .find(|candidate| candidate.is_file())
    }
}

/// The current user's home directory, if one is known.
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir().filter(|home| !home.as_os_str().is_empty())
}
