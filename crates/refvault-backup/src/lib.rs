//! Generational backup persistence for refvault.
//!
//! A [`BackupStore`] owns one logical [`ReferenceStore`] document under a
//! base directory and keeps a bounded chain of older copies next to it:
//!
//! ```text
//! <base_dir>/<file_name>                              primary document
//! <base_dir>/<backup_dir>/<file_name>                 latest backup
//! <base_dir>/<backup_dir>/<stem>_0<ext> .. _<N-1><ext> generation chain
//! ```
//!
//! # Design Rules
//!
//! 1. The backup side is always updated before the primary file is touched.
//! 2. Generation 0 holds what the latest backup contained just before the
//!    most recent write; older generations shift up by one per write.
//! 3. Precondition violations fail before anything is written.
//! 4. There is no locking. One writer per document is assumed.
//!
//! # Modules
//!
//! - [`error`] — [`BackupError`] and the result alias
//! - [`config`] — [`BackupConfig`], resolved once and passed by value
//! - [`paths`] — [`BackupPaths`] derived from a config
//! - [`fs`] — the [`FileSystem`] capability and its implementations
//! - [`rotation`] — rotation as a pure plan plus its executor
//! - [`store`] — the create/read/write protocol

pub mod config;
pub mod error;
pub mod fs;
pub mod paths;
pub mod rotation;
pub mod store;

pub use config::BackupConfig;
pub use error::{BackupError, BackupResult};
pub use fs::{FileSystem, MemoryFileSystem, TokioFileSystem};
pub use paths::BackupPaths;
pub use rotation::{plan_rotation, RotationStep};
pub use store::{BackupStore, GenerationSlot};

pub use refvault_store::ReferenceStore;
