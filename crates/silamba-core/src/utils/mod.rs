//! Utility functions for string formatting and JSON inspection.

pub mod format;

pub use format::{capitalize, slugify, truncate_string};

use serde_json::Value;

/// Name of a JSON value's kind, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
