//! Derivation of every on-disk location from a [`BackupConfig`].

use std::path::PathBuf;

use crate::config::BackupConfig;
use crate::error::{BackupError, BackupResult};

/// The primary, latest-backup, and generation paths for one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackupPaths {
    /// `<base_dir>/<file_name>`
    pub primary: PathBuf,
    /// `<base_dir>/<backup_dir>/<file_name>`
    pub latest: PathBuf,
    /// `<base_dir>/<backup_dir>/<stem>_<i><ext>` for `i` in `0..depth`.
    pub generations: Vec<PathBuf>,
}

impl BackupPaths {
    /// Derive all paths, splitting the file name on its last `.`.
    pub fn derive(config: &BackupConfig) -> BackupResult<Self> {
        let (stem, ext) =
            split_extension(&config.file_name).ok_or_else(|| BackupError::MissingExtension {
                file_name: config.file_name.clone(),
            })?;

        let backup_dir = config.base_dir.join(&config.backup_dir);
        let generations = (0..config.depth)
            .map(|i| backup_dir.join(format!("{stem}_{i}{ext}")))
            .collect();

        Ok(Self {
            primary: config.base_dir.join(&config.file_name),
            latest: backup_dir.join(&config.file_name),
            generations,
        })
    }

    /// Directory holding the latest backup and the generations.
    pub fn backup_dir(&self) -> Option<&std::path::Path> {
        self.latest.parent()
    }
}

/// Split `name` into stem and extension (with its leading dot).
fn split_extension(name: &str) -> Option<(&str, &str)> {
    name.rfind('.').map(|dot| name.split_at(dot))
}
