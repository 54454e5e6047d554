//! Names payload: the JSON convention carried inside version-0 frames.
//!
//! The payload is a UTF-8 JSON array of strings. Payloads come from anyone
//! who can pay for a transaction, so decoding is strict and fallible: a
//! record is either an array whose every element is a string, or it is
//! rejected as a whole.

use serde_json::Value;

use crate::frame::{self, Frame};

/// Serialize names as a compact JSON array. Order is preserved.
pub fn encode_names<S: AsRef<str>>(names: &[S]) -> Vec<u8> {
    let values: Vec<Value> = names
        .iter()
        .map(|n| Value::String(n.as_ref().to_owned()))
        .collect();
    // Serializing a Value built from strings cannot fail.
    serde_json::to_vec(&Value::Array(values)).unwrap_or_else(|_| b"[]".to_vec())
}

/// Build the complete frame for a set of names.
pub fn names_frame<S: AsRef<str>>(version: u8, names: &[S]) -> Frame {
    Frame::new(version, encode_names(names))
}

/// Build the raw frame bytes for a set of names.
pub fn encode_names_frame<S: AsRef<str>>(version: u8, names: &[S]) -> Vec<u8> {
    frame::encode(version, &encode_names(names))
}

/// Decode a payload into names.
pub fn decode_names(payload: &[u8]) -> Result<Vec<String>, PayloadError> {
    let text = std::str::from_utf8(payload).map_err(PayloadError::InvalidUtf8)?;
    let value: Value = serde_json::from_str(text).map_err(PayloadError::InvalidJson)?;

    let items = match value {
        Value::Array(items) => items,
        other => return Err(PayloadError::NotStringArray(kind(&other))),
    };

    let mut names = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => names.push(s),
            other => return Err(PayloadError::NotStringArray(kind(&other))),
        }
    }
    Ok(names)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a version-matching payload could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[source] std::str::Utf8Error),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("payload is not an array of strings (found {0})")]
    NotStringArray(&'static str),
}
