//! Structured value extraction from free-form model text.
//!
//! Models routinely wrap their JSON in a markdown fence and surround it with
//! commentary. Extraction narrows the text to the first fenced block (when one
//! exists), trims it, and parses what is left. Nothing is repaired: a trailing
//! comma or a single-quoted key is a failure, not something to fix up.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

const FENCE: &str = "```";
const JSON_TAG: &str = "json";

/// Errors produced while recovering a structured value from model text.
#[derive(Debug, Clone, Error)]
pub enum ExtractError {
    /// No syntactically valid object or array could be recovered.
    #[error("malformed model output: {message}")]
    Malformed { message: String, raw: String },

    /// The value parsed but does not have the expected shape.
    #[error("model output does not match schema: {message}")]
    Schema { message: String, raw: String },
}

impl ExtractError {
    /// The verbatim model text that failed extraction.
    pub fn raw(&self) -> &str {
        match self {
            ExtractError::Malformed { raw, .. } | ExtractError::Schema { raw, .. } => raw,
        }
    }

    /// The parser or schema message, without the raw text.
    pub fn message(&self) -> &str {
        match self {
            ExtractError::Malformed { message, .. } | ExtractError::Schema { message, .. } => {
                message
            }
        }
    }
}

/// Return the region of `raw` that should hold the structured value.
///
/// If `raw` contains a terminated fenced block, its inner content is returned
/// (an optional `json` tag after the opening fence is dropped). Otherwise the
/// whole text is returned. Either way the result is trimmed.
pub fn candidate_region(raw: &str) -> &str {
    fenced_content(raw).unwrap_or(raw).trim()
}

fn fenced_content(raw: &str) -> Option<&str> {
    let open = raw.find(FENCE)?;
    let after_open = &raw[open + FENCE.len()..];
    let body = after_open.strip_prefix(JSON_TAG).unwrap_or(after_open);
    let close = body.find(FENCE)?;
    Some(&body[..close])
}

/// Recover a JSON object or array from model text.
pub fn extract(raw: &str) -> Result<Value, ExtractError> {
    let candidate = candidate_region(raw);

    let value: Value = serde_json::from_str(candidate).map_err(|e| ExtractError::Malformed {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        other => Err(ExtractError::Malformed {
            message: format!("expected a JSON object or array, found {}", kind_of(&other)),
            raw: raw.to_string(),
        }),
    }
}

/// Recover a structured value and deserialize it into `T`.
///
/// Syntax problems are `Malformed`; a value of the wrong shape is `Schema`.
pub fn extract_as<T: DeserializeOwned>(raw: &str) -> Result<T, ExtractError> {
    let value = extract(raw)?;
    serde_json::from_value(value).map_err(|e| ExtractError::Schema {
        message: e.to_string(),
        raw: raw.to_string(),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
