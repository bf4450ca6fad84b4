//! The create/read/write protocol over a generational backup chain.

use std::path::{Path, PathBuf};

use refvault_store::ReferenceStore;
use tracing::{debug, info, warn};

use crate::config::BackupConfig;
use crate::error::{BackupError, BackupResult};
use crate::fs::{FileSystem, TokioFileSystem};
use crate::paths::BackupPaths;
use crate::rotation;

/// One numbered slot of the backup chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationSlot {
    /// 0 is the most recently archived generation.
    pub index: usize,
    pub path: PathBuf,
    pub exists: bool,
}

/// Durable storage for a single [`ReferenceStore`] document.
///
/// Every write goes to the backup side first (rotate, then latest backup)
/// and only then to the primary file. A crash part-way leaves the primary at
/// its last committed content.
#[derive(Debug)]
pub struct BackupStore<F: FileSystem = TokioFileSystem> {
    config: BackupConfig,
    fs: F,
}

impl BackupStore<TokioFileSystem> {
    /// A store on the real file system.
    pub fn new(config: BackupConfig) -> Self {
        Self::with_fs(config, TokioFileSystem)
    }
}

impl<F: FileSystem> BackupStore<F> {
    /// A store on the given file-system backend.
    pub fn with_fs(config: BackupConfig, fs: F) -> Self {
        Self { config, fs }
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    /// Derive the on-disk layout. Fails if the file name has no extension.
    pub fn paths(&self) -> BackupResult<BackupPaths> {
        BackupPaths::derive(&self.config)
    }

    /// Initialize an empty document and its backup chain.
    ///
    /// Fails with [`BackupError::AlreadyExists`] if the primary file is
    /// present. A latest backup left over from a lost primary is rotated
    /// into the chain rather than overwritten.
    pub async fn create(&self) -> BackupResult<ReferenceStore> {
        let paths = self.paths()?;
        if self.fs.exists(&paths.primary).await? {
            return Err(BackupError::AlreadyExists { path: paths.primary });
        }

        self.ensure_parent(&paths.primary).await?;
        self.ensure_parent(&paths.latest).await?;

        let store = ReferenceStore::new();
        let content = store.serialize()?;

        if self.fs.exists(&paths.latest).await? {
            warn!(
                latest = %paths.latest.display(),
                "found backups without a primary document; archiving them"
            );
            rotation::rotate(&self.fs, &paths.latest, &paths.generations).await?;
        }
        self.fs.write(&paths.latest, &content).await?;
        self.fs.write(&paths.primary, &content).await?;

        info!(primary = %paths.primary.display(), "created document");
        Ok(store)
    }

    /// Load the primary document.
    ///
    /// Unreadable content does not fail; it yields a store whose diagnostics
    /// describe the problem. The latest backup is compared with the primary;
    /// a mismatch or an unreadable backup is logged and never fails the read.
    pub async fn read(&self) -> BackupResult<ReferenceStore> {
        let paths = self.paths()?;
        if !self.fs.exists(&paths.primary).await? {
            return Err(BackupError::NotFound { path: paths.primary });
        }

        let text = self.fs.read_to_string(&paths.primary).await?;
        self.check_parity(&paths, &text).await;

        let store = ReferenceStore::deserialize(&text);
        debug!(
            references = store.len(),
            messages = store.messages().len(),
            "read document"
        );
        Ok(store)
    }

    /// Persist `store` through the backup chain.
    ///
    /// Fails with [`BackupError::MissingBackupChain`] before touching any
    /// file if the chain was never created.
    pub async fn write(&self, store: &ReferenceStore) -> BackupResult<()> {
        let paths = self.paths()?;
        if !self.fs.exists(&paths.latest).await? {
            return Err(BackupError::MissingBackupChain { path: paths.latest });
        }

        let content = store.serialize()?;
        rotation::rotate(&self.fs, &paths.latest, &paths.generations).await?;
        self.fs.write(&paths.latest, &content).await?;
        self.fs.write(&paths.primary, &content).await?;

        info!(primary = %paths.primary.display(), references = store.len(), "wrote document");
        Ok(())
    }

    /// Rotate the chain without writing new content.
    pub async fn rotate(&self) -> BackupResult<()> {
        let paths = self.paths()?;
        rotation::rotate(&self.fs, &paths.latest, &paths.generations).await
    }

    /// Every generation slot with whether it is currently populated.
    pub async fn generations(&self) -> BackupResult<Vec<GenerationSlot>> {
        let paths = self.paths()?;
        let mut slots = Vec::with_capacity(paths.generations.len());
        for (index, path) in paths.generations.into_iter().enumerate() {
            let exists = self.fs.exists(&path).await?;
            slots.push(GenerationSlot { index, path, exists });
        }
        Ok(slots)
    }

    async fn check_parity(&self, paths: &BackupPaths, primary: &str) {
        let backup = match self.fs.exists(&paths.latest).await {
            Ok(true) => self.fs.read_to_string(&paths.latest).await,
            Ok(false) => return,
            Err(e) => Err(e),
        };
        match backup {
            Ok(backup) if backup == primary => {}
            Ok(_) => warn!(
                primary = %paths.primary.display(),
                latest = %paths.latest.display(),
                "primary document differs from latest backup"
            ),
            Err(e) => warn!(
                latest = %paths.latest.display(),
                error = %e,
                "latest backup is unreadable"
            ),
        }
    }

    async fn ensure_parent(&self, path: &Path) -> BackupResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs.create_dir_all(parent).await?;
            }
        }
        Ok(())
    }
}
