//! Shared vocabulary for the document store boundary.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// A schemaless document: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// Single-field equality predicate, the only filter shape the boundary needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Acknowledgment level a write must reach before it is reported successful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteConcern {
    /// The backend's default acknowledgment.
    #[default]
    Acknowledged,
    /// The strongest level the backend offers. Security-relevant writes
    /// request this so an acknowledged write cannot be lost on failover.
    Majority,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Insert the update as a fresh document when the filter matches nothing.
    pub upsert: bool,
}

impl UpdateOptions {
    pub fn upsert() -> Self {
        Self { upsert: true }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted: u64,
}

/// Encode a serializable value as a document.
pub fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    match serde_json::to_value(value).map_err(|err| StoreError::Codec(err.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Codec(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Decode a document back into a typed value.
pub fn from_document<T: DeserializeOwned>(document: Document) -> StoreResult<T> {
    serde_json::from_value(Value::Object(document)).map_err(|err| StoreError::Codec(err.to_string()))
}
