//! The file-system capability the backup store runs against.
//!
//! [`TokioFileSystem`] is the real backend. [`MemoryFileSystem`] keeps files
//! in a map behind a `RwLock` and is meant for tests and short-lived use.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;

/// Asynchronous file operations used by the backup store.
///
/// `rename` and `copy` replace an existing destination.
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn exists(&self, path: &Path) -> io::Result<bool>;
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()>;
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by `tokio::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        tokio::fs::try_exists(path).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::rename(from, to).await
    }

    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::copy(from, to).await.map(|_| ())
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }
}

/// In-memory [`FileSystem`]. Directories are implicit.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a file's contents, if present.
    pub fn get(&self, path: &Path) -> Option<String> {
        self.files.read().ok()?.get(path).cloned()
    }

    /// Number of files held.
    pub fn len(&self) -> usize {
        self.files.read().map(|files| files.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_files<T>(
        &self,
        f: impl FnOnce(&mut HashMap<PathBuf, String>) -> io::Result<T>,
    ) -> io::Result<T> {
        let mut files = self
            .files
            .write()
            .map_err(|e| io::Error::other(format!("lock poisoned: {e}")))?;
        f(&mut files)
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such file: {}", path.display()))
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        self.with_files(|files| Ok(files.contains_key(path)))
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.with_files(|files| files.get(path).cloned().ok_or_else(|| not_found(path)))
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.with_files(|files| {
            files.insert(path.to_path_buf(), contents.to_string());
            Ok(())
        })
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.with_files(|files| {
            let contents = files.remove(from).ok_or_else(|| not_found(from))?;
            files.insert(to.to_path_buf(), contents);
            Ok(())
        })
    }

    async fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.with_files(|files| {
            let contents = files.get(from).cloned().ok_or_else(|| not_found(from))?;
            files.insert(to.to_path_buf(), contents);
            Ok(())
        })
    }

    async fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_rename_moves_and_overwrites() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("a"), "one").await.unwrap();
        fs.write(Path::new("b"), "two").await.unwrap();

        fs.rename(Path::new("a"), Path::new("b")).await.unwrap();

        assert!(!fs.exists(Path::new("a")).await.unwrap());
        assert_eq!(fs.get(Path::new("b")).as_deref(), Some("one"));
        assert_eq!(fs.len(), 1);
    }

    #[tokio::test]
    async fn memory_copy_keeps_source() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("a"), "one").await.unwrap();
        fs.copy(Path::new("a"), Path::new("b")).await.unwrap();

        assert_eq!(fs.get(Path::new("a")).as_deref(), Some("one"));
        assert_eq!(fs.get(Path::new("b")).as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn memory_missing_file_is_not_found() {
        let fs = MemoryFileSystem::new();
        let err = fs.read_to_string(Path::new("nope")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(fs.rename(Path::new("nope"), Path::new("x")).await.is_err());
    }

    #[tokio::test]
    async fn tokio_fs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem;
        let nested = dir.path().join("x/y");
        fs.create_dir_all(&nested).await.unwrap();

        let a = nested.join("a.txt");
        let b = nested.join("b.txt");
        fs.write(&a, "hello").await.unwrap();
        fs.copy(&a, &b).await.unwrap();
        fs.rename(&a, &nested.join("c.txt")).await.unwrap();

        assert!(!fs.exists(&a).await.unwrap());
        assert_eq!(fs.read_to_string(&b).await.unwrap(), "hello");
        assert_eq!(fs.read_to_string(&nested.join("c.txt")).await.unwrap(), "hello");
    }
}
