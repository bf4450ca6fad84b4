//! Record and diagnostic types held by the reference store.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload keys that would collide with `id` and `type` when serialized.
pub const RESERVED_FIELDS: [&str; 2] = ["id", "type"];

/// A typed, uniquely identified record.
///
/// The store only interprets `id` and `kind`. Every other field of the
/// serialized object is carried through untouched in `payload`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Primary key, unique within one store.
    pub id: String,
    /// Variant discriminator (serialized as `type`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Variant-specific fields, opaque to the store.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Reference {
    /// Create a reference with an empty payload.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            payload: Map::new(),
        }
    }

    /// The first payload key that shadows `id` or `type`, if any.
    pub fn reserved_field(&self) -> Option<&'static str> {
        RESERVED_FIELDS.into_iter().find(|field| self.payload.contains_key(*field))
    }

    /// Builder-style helper to attach a payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }
}

/// Severity of a diagnostic entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Warning => f.write_str("WARNING"),
            Level::Error => f.write_str("ERROR"),
        }
    }
}

/// An append-only log entry describing a data-quality event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    /// Ids of the references this entry concerns, if any.
    #[serde(rename = "refIds", default, skip_serializing_if = "Option::is_none")]
    pub ref_ids: Option<Vec<String>>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>, ref_ids: Option<Vec<String>>) -> Self {
        Self {
            level,
            message: message.into(),
            ref_ids,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == Level::Warning
    }
}
