//! Settings for a backup store: where the document lives and how many
//! generations to keep.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{BackupError, BackupResult};

/// Base directory used when none is configured.
pub const DEFAULT_BASE_DIR: &str = "data";
/// Number of generations kept when none is configured.
pub const DEFAULT_DEPTH: usize = 3;
/// Backup subdirectory used when none is configured.
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Fully resolved settings for one [`BackupStore`](crate::BackupStore).
///
/// The file name is validated lazily: a name without an extension is only
/// rejected when paths are derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Directory holding the primary document.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    /// Logical document name, e.g. `refs.json`.
    pub file_name: String,
    /// Number of numbered generations retained.
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Name of the backup subdirectory under `base_dir`.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BASE_DIR)
}

fn default_depth() -> usize {
    DEFAULT_DEPTH
}

fn default_backup_dir() -> String {
    DEFAULT_BACKUP_DIR.to_string()
}

impl BackupConfig {
    /// Settings for `file_name` with every other field at its default.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            base_dir: default_base_dir(),
            file_name: file_name.into(),
            depth: DEFAULT_DEPTH,
            backup_dir: default_backup_dir(),
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_backup_dir(mut self, backup_dir: impl Into<String>) -> Self {
        self.backup_dir = backup_dir.into();
        self
    }

    /// Parse settings from TOML. Only `file_name` is required.
    pub fn from_toml_str(text: &str) -> BackupResult<Self> {
        toml::from_str(text).map_err(|e| BackupError::Config(e.to_string()))
    }
}
