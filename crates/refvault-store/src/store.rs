//! The [`ReferenceStore`]: an ordered record set with derived indices.
//!
//! The raw sequence is the source of truth. The id index and the type index
//! hold positions into it and are only ever written by [`ReferenceStore::admit`],
//! which both the tolerant bulk-load path and the strict `add_ref` path go
//! through.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::envelope::CURRENT_VERSION;
use crate::error::{StoreError, StoreResult};
use crate::types::{Diagnostic, Level, Reference, RESERVED_FIELDS};

/// How [`ReferenceStore::admit`] treats an id that is already indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DuplicatePolicy {
    /// Keep the raw record, skip indexing, log a diagnostic.
    Diagnose,
    /// Refuse the record and leave the store untouched.
    Reject,
}

/// An in-memory collection of [`Reference`] records plus a diagnostic log.
#[derive(Clone, Debug)]
pub struct ReferenceStore {
    version: u32,
    /// Every record ever admitted, including skipped duplicates.
    raw: Vec<Reference>,
    /// Positions in `raw` of indexed records, in first-seen order.
    indexed: Vec<usize>,
    by_id: HashMap<String, usize>,
    by_type: HashMap<String, Vec<usize>>,
    /// Distinct types in first-seen order.
    type_order: Vec<String>,
    messages: Vec<Diagnostic>,
}

impl ReferenceStore {
    /// Create an empty store at the current format version.
    pub fn new() -> Self {
        Self::empty(CURRENT_VERSION, Vec::new())
    }

    /// Build a store from raw records and an existing diagnostic log.
    ///
    /// Records are admitted in order. A record whose id is already indexed is
    /// kept in the raw sequence but not indexed, and a diagnostic is appended:
    /// an ERROR when the types differ, a WARNING when they match.
    ///
    /// Payload keys named `id` or `type` on an indexed record are dropped with
    /// a WARNING, so the record serializes without duplicate keys.
    pub fn from_parts(
        references: Vec<Reference>,
        messages: Vec<Diagnostic>,
        version: u32,
    ) -> Self {
        let mut store = Self::empty(version, messages);
        for reference in references {
            // Diagnose never rejects.
            let _ = store.admit(reference, DuplicatePolicy::Diagnose);
        }
        store
    }

    fn empty(version: u32, messages: Vec<Diagnostic>) -> Self {
        Self {
            version,
            raw: Vec::new(),
            indexed: Vec::new(),
            by_id: HashMap::new(),
            by_type: HashMap::new(),
            type_order: Vec::new(),
            messages,
        }
    }

    /// Format version this store was built at.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Number of indexed references.
    pub fn len(&self) -> usize {
        self.indexed.len()
    }

    /// Returns `true` if no reference is indexed.
    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty()
    }

    /// Indexed references of the given type, in insertion order.
    pub fn get_refs(&self, kind: &str) -> Vec<&Reference> {
        self.by_type
            .get(kind)
            .map(|positions| positions.iter().map(|&pos| &self.raw[pos]).collect())
            .unwrap_or_default()
    }

    /// The indexed reference with the given id, if any.
    pub fn get_ref(&self, id: &str) -> Option<&Reference> {
        self.by_id.get(id).map(|&pos| &self.raw[pos])
    }

    /// All indexed references in first-seen order.
    pub fn references(&self) -> impl Iterator<Item = &Reference> + '_ {
        self.indexed.iter().map(|&pos| &self.raw[pos])
    }

    /// The full raw sequence, including duplicates skipped during bulk load.
    pub fn raw_references(&self) -> &[Reference] {
        &self.raw
    }

    /// Distinct reference types in first-seen order.
    pub fn types(&self) -> &[String] {
        &self.type_order
    }

    /// The diagnostic log, oldest first.
    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    /// Add a reference, failing if its id is already indexed or its payload
    /// shadows `id` or `type`.
    ///
    /// On failure neither the raw sequence nor the indices change.
    pub fn add_ref(&mut self, reference: Reference) -> StoreResult<()> {
        self.admit(reference, DuplicatePolicy::Reject)
    }

    /// Append a diagnostic entry.
    pub fn push_message(
        &mut self,
        level: Level,
        message: impl Into<String>,
        ref_ids: Option<Vec<String>>,
    ) {
        let diagnostic = Diagnostic::new(level, message, ref_ids);
        warn!(level = %diagnostic.level, ref_ids = ?diagnostic.ref_ids, "{}", diagnostic.message);
        self.messages.push(diagnostic);
    }

    pub fn push_warning(&mut self, message: impl Into<String>, ref_ids: Option<Vec<String>>) {
        self.push_message(Level::Warning, message, ref_ids);
    }

    pub fn push_error(&mut self, message: impl Into<String>, ref_ids: Option<Vec<String>>) {
        self.push_message(Level::Error, message, ref_ids);
    }

    /// Single entry point for both insertion paths.
    fn admit(&mut self, mut reference: Reference, policy: DuplicatePolicy) -> StoreResult<()> {
        if let Some(field) = reference.reserved_field() {
            if policy == DuplicatePolicy::Reject {
                return Err(StoreError::ReservedField {
                    id: reference.id,
                    field: field.to_string(),
                });
            }
        }

        if let Some(&existing) = self.by_id.get(&reference.id) {
            if policy == DuplicatePolicy::Reject {
                return Err(StoreError::DuplicateId { id: reference.id });
            }

            let existing_kind = self.raw[existing].kind.clone();
            let ids = Some(vec![reference.id.clone()]);
            if existing_kind != reference.kind {
                self.push_error(
                    format!(
                        "duplicate id '{}' with conflicting types: kept '{}', skipped '{}'",
                        reference.id, existing_kind, reference.kind
                    ),
                    ids,
                );
            } else {
                self.push_warning(
                    format!(
                        "duplicate id '{}' of type '{}'; later occurrence skipped",
                        reference.id, reference.kind
                    ),
                    ids,
                );
            }
            self.raw.push(reference);
            return Ok(());
        }

        if let Some(field) = reference.reserved_field() {
            for key in RESERVED_FIELDS {
                reference.payload.remove(key);
            }
            self.push_warning(
                format!(
                    "reference '{}' carried reserved payload field '{}'; dropped it",
                    reference.id, field
                ),
                Some(vec![reference.id.clone()]),
            );
        }

        let pos = self.raw.len();
        self.by_id.insert(reference.id.clone(), pos);
        match self.by_type.get_mut(&reference.kind) {
            Some(bucket) => bucket.push(pos),
            None => {
                self.type_order.push(reference.kind.clone());
                self.by_type.insert(reference.kind.clone(), vec![pos]);
            }
        }
        self.indexed.push(pos);
        debug!(id = %reference.id, kind = %reference.kind, "indexed reference");
        self.raw.push(reference);
        Ok(())
    }
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new()
    }
}
