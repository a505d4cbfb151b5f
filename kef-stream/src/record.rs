//! Raw records returned by the poll endpoint
//!
//! A poll answers with a JSON array. Each element is either a value record
//! (`path`, `itemType`, `itemValue`) or a rows record describing index-level
//! changes to an ordered collection (`rowsType`, `rowsOldVersion`,
//! `rowsVersion`, `rowsEvents`). Elements are classified independently so a
//! single malformed element never spoils the rest of the batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;

/// One index-level change in a rows record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowChange {
    #[serde(rename = "type")]
    pub change_type: String,
    pub index: i64,
}

/// A record as decoded from a poll response
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// A value change for a subscribed path
    Value {
        path: String,
        item_type: Option<String>,
        value: Option<Value>,
    },
    /// A change to an ordered collection such as the play queue
    Rows {
        path: Option<String>,
        version_old: i64,
        version: i64,
        changes: Vec<RowChange>,
    },
}

impl RawRecord {
    pub fn path(&self) -> Option<&str> {
        match self {
            RawRecord::Value { path, .. } => Some(path),
            RawRecord::Rows { path, .. } => path.as_deref(),
        }
    }
}

/// An element of the poll response that could not be classified
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecord {
    pub path: Option<String>,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    item_type: Option<String>,
    #[serde(default)]
    item_value: Option<Value>,
    #[serde(default)]
    rows_type: Option<String>,
    #[serde(default)]
    rows_old_version: Option<i64>,
    #[serde(default)]
    rows_version: Option<i64>,
    #[serde(default)]
    rows_events: Option<Vec<RowChange>>,
}

impl WireRecord {
    fn is_rows(&self) -> bool {
        self.rows_type.is_some()
            || self.rows_old_version.is_some()
            || self.rows_version.is_some()
            || self.rows_events.is_some()
    }

    fn into_record(self) -> Result<RawRecord, MalformedRecord> {
        if self.is_rows() {
            return Ok(RawRecord::Rows {
                path: self.path,
                version_old: self.rows_old_version.unwrap_or(0),
                version: self.rows_version.unwrap_or(0),
                changes: self.rows_events.unwrap_or_default(),
            });
        }

        match self.path {
            Some(path) => Ok(RawRecord::Value {
                path,
                item_type: self.item_type,
                value: self.item_value.filter(|v| !v.is_null()),
            }),
            None => Err(MalformedRecord {
                path: None,
                reason: "record has neither a path nor rows data".to_string(),
            }),
        }
    }
}

/// Split a poll response body into per-element results.
///
/// An empty body or `null` is an empty batch. Anything other than a JSON
/// array is a cycle failure.
pub fn parse_poll_response(
    body: &str,
) -> Result<Vec<Result<RawRecord, MalformedRecord>>, TransportError> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }

    let document: Value = serde_json::from_str(body)
        .map_err(|e| TransportError::Parse(format!("invalid poll response: {}", e)))?;

    let elements = match document {
        Value::Array(elements) => elements,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(TransportError::Parse(format!(
                "poll response is not an array: {}",
                json_kind(&other)
            )))
        }
    };

    Ok(elements.into_iter().map(classify).collect())
}

fn classify(element: Value) -> Result<RawRecord, MalformedRecord> {
    let path = element
        .get("path")
        .and_then(Value::as_str)
        .map(str::to_string);

    match serde_json::from_value::<WireRecord>(element) {
        Ok(wire) => wire.into_record(),
        Err(e) => Err(MalformedRecord {
            path,
            reason: e.to_string(),
        }),
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
