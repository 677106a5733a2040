//! NDJSON parser for the Ollama generate stream.
//!
//! Implements tolerant reader pattern: only the line itself must be valid
//! JSON. A value without a string `response` yields an empty fragment.

use serde_json::Value;

use super::types::Fragment;
use crate::error::{Error, Result};

/// Parse a single NDJSON line from the backend.
///
/// Fails only when the line is not JSON; the error carries the decoder's
/// description of what went wrong.
pub fn parse_line(line: &str) -> Result<Fragment> {
    let raw: Value = serde_json::from_str(line).map_err(|e| Error::NdjsonParse(e.to_string()))?;
    Ok(parse_value(&raw))
}

/// Extract a fragment from an already decoded JSON value.
fn parse_value(raw: &Value) -> Fragment {
    let response = raw
        .get("response")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let done = raw.get("done").and_then(Value::as_bool).unwrap_or(false);

    let model = raw.get("model").and_then(Value::as_str).map(String::from);

    Fragment {
        response,
        done,
        model,
    }
}
