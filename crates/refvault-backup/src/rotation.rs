//! Backup rotation, planned as data and then applied to a [`FileSystem`].
//!
//! Given `N` generation slots, rotation shifts every occupied slot `i - 1`
//! into slot `i` (highest first, so slot `N - 1` is evicted) and then copies
//! the latest backup into slot 0.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BackupError, BackupResult};
use crate::fs::FileSystem;

/// One file operation of a rotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RotationStep {
    /// Move `from` to `to`, replacing whatever is at `to`.
    Rename { from: PathBuf, to: PathBuf },
    /// Copy `from` to `to`, leaving `from` in place.
    Copy { from: PathBuf, to: PathBuf },
}

/// Compute the steps that rotate `generations` behind `latest`.
///
/// `generations[i]` is `(exists, path)` for slot `i`, newest first. Empty
/// slots are skipped rather than shifted, so a partially filled chain only
/// grows by one slot per rotation.
pub fn plan_rotation(latest: &Path, generations: &[(bool, PathBuf)]) -> Vec<RotationStep> {
    let mut steps = Vec::with_capacity(generations.len());
    for i in (1..generations.len()).rev() {
        let (occupied, from) = &generations[i - 1];
        if *occupied {
            steps.push(RotationStep::Rename {
                from: from.clone(),
                to: generations[i].1.clone(),
            });
        }
    }
    if let Some((_, newest)) = generations.first() {
        steps.push(RotationStep::Copy {
            from: latest.to_path_buf(),
            to: newest.clone(),
        });
    }
    steps
}

/// Rotate the chain on `fs`. Fails if `latest` does not exist.
pub async fn rotate<F: FileSystem + ?Sized>(
    fs: &F,
    latest: &Path,
    generations: &[PathBuf],
) -> BackupResult<()> {
    if !fs.exists(latest).await? {
        return Err(BackupError::RotationPrecondition {
            path: latest.to_path_buf(),
        });
    }

    let mut slots = Vec::with_capacity(generations.len());
    for path in generations {
        slots.push((fs.exists(path).await?, path.clone()));
    }

    for step in plan_rotation(latest, &slots) {
        apply(fs, &step).await?;
    }
    Ok(())
}

async fn apply<F: FileSystem + ?Sized>(fs: &F, step: &RotationStep) -> BackupResult<()> {
    match step {
        RotationStep::Rename { from, to } => {
            debug!(from = %from.display(), to = %to.display(), "rotate: rename");
            fs.rename(from, to).await?;
        }
        RotationStep::Copy { from, to } => {
            debug!(from = %from.display(), to = %to.display(), "rotate: copy");
            fs.copy(from, to).await?;
        }
    }
    Ok(())
}
