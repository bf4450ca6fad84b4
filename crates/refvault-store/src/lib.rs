//! In-memory reference store for refvault.
//!
//! A [`ReferenceStore`] holds an ordered sequence of typed, uniquely
//! identified [`Reference`] records, two derived indices over them (by id and
//! by type), and an append-only log of [`Diagnostic`] entries describing
//! data-quality problems found while loading.
//!
//! # Architecture
//!
//! - **Bulk load** (`from_parts`, `deserialize`) tolerates duplicate ids: the
//!   first occurrence is indexed and every later one is recorded as a
//!   diagnostic.
//! - **Live mutation** (`add_ref`) rejects duplicate ids with
//!   [`StoreError::DuplicateId`].
//! - Both paths run through a single admission routine, so the indices are
//!   always a deterministic function of the raw sequence.
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`types`] — [`Reference`], [`Diagnostic`], [`Level`]
//! - [`store`] — The [`ReferenceStore`] itself
//! - [`envelope`] — The versioned JSON document format

pub mod envelope;
pub mod error;
pub mod store;
pub mod types;

pub use envelope::CURRENT_VERSION;
pub use error::{StoreError, StoreResult};
pub use store::ReferenceStore;
pub use types::{Diagnostic, Level, Reference};
