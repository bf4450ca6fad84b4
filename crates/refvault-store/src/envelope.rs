//! The versioned JSON document a [`ReferenceStore`] is persisted as.
//!
//! ```text
//! {
//!   "version": 1,
//!   "references": [ { "id": "...", "type": "...", ...payload }, ... ],
//!   "messages": [ { "level": "WARNING" | "ERROR", "message": "...", "refIds"?: [...] }, ... ]
//! }
//! ```
//!
//! Loading never fails. Unreadable or mismatched documents produce an empty
//! store whose diagnostics carry the reason and the raw text.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::store::ReferenceStore;
use crate::types::{Diagnostic, Reference};

/// The only document version this build reads and writes.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a> {
    version: u32,
    references: Vec<&'a Reference>,
    messages: &'a [Diagnostic],
}

impl ReferenceStore {
    /// Encode the store as a pretty-printed JSON document.
    ///
    /// Only indexed references are written. Raw duplicates skipped during a
    /// bulk load are not part of the output.
    pub fn serialize(&self) -> StoreResult<String> {
        let envelope = Envelope {
            version: CURRENT_VERSION,
            references: self.references().collect(),
            messages: self.messages(),
        };
        serde_json::to_string_pretty(&envelope)
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode a document, degrading to a usable store on bad input.
    pub fn deserialize(text: &str) -> Self {
        let document = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                let reason = format!("document is not an object: found {}", json_kind(&other));
                return Self::unreadable(reason, text);
            }
            Err(e) => return Self::unreadable(format!("failed to parse document: {e}"), text),
        };
        Self::from_document(document, text)
    }

    fn from_document(mut document: Map<String, Value>, text: &str) -> Self {
        let found = document.get("version");
        if found.and_then(Value::as_u64) != Some(u64::from(CURRENT_VERSION)) {
            let found = found.map(Value::to_string).unwrap_or_else(|| "null".to_string());
            return Self::unreadable(
                format!("unsupported document version: expected {CURRENT_VERSION}, found {found}"),
                text,
            );
        }

        let references = match document.remove("references") {
            Some(value) => match serde_json::from_value::<Vec<Reference>>(value) {
                Ok(references) => references,
                Err(e) => return Self::unreadable(format!("failed to parse references: {e}"), text),
            },
            None => {
                let reason = "failed to parse document: missing field `references`";
                return Self::unreadable(reason, text);
            }
        };

        let messages = document
            .remove("messages")
            .filter(Value::is_array)
            .and_then(|value| serde_json::from_value::<Vec<Diagnostic>>(value).ok());

        match messages {
            Some(messages) => {
                debug!(
                    references = references.len(),
                    messages = messages.len(),
                    "decoded document"
                );
                Self::from_parts(references, messages, CURRENT_VERSION)
            }
            None => {
                let mut store = Self::from_parts(references, Vec::new(), CURRENT_VERSION);
                store.push_warning(
                    "document has no valid `messages` list; starting a new log",
                    None,
                );
                store.push_warning(text, None);
                store
            }
        }
    }

    /// An empty store carrying the failure reason and the raw text.
    fn unreadable(reason: impl Into<String>, text: &str) -> Self {
        let mut store = Self::new();
        store.push_error(reason, None);
        store.push_error(text, None);
        store
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
