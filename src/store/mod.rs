pub mod collection;
pub mod data_dir;
pub mod filter;
pub mod goals;
pub mod update;
pub mod users;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{PlanError, Result};

/// A schema-less stored record.
pub type Document = Map<String, Value>;

/// Store-assigned identifier field.
pub const ID_FIELD: &str = "_id";

/// Store-assigned creation timestamp field.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Current time in the millisecond-precision RFC 3339 form used on disk.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Identifier of a document or sub-document, if it carries a string `_id`.
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(PlanError::InvalidUpdate(format!(
            "expected an object, got {other}"
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}
