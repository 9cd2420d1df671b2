//! Errors raised while converting caller payloads into gateway types.

use thiserror::Error;

/// A caller-supplied payload could not be turned into a gateway type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The payload was expected to be a JSON object.
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(String),

    /// An update payload carried both `doc` and `script`.
    #[error("Update payload must contain exactly one of `doc` or `script`, found both")]
    AmbiguousUpdate,

    /// An update payload carried neither `doc` nor `script`.
    #[error("Update payload must contain one of `doc` or `script`")]
    MissingUpdate,

    /// A field had an unexpected shape.
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

impl PayloadError {
    /// Create a not-an-object error describing the offending JSON value.
    pub fn not_an_object(value: &serde_json::Value) -> Self {
        let kind = match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "a boolean",
            serde_json::Value::Number(_) => "a number",
            serde_json::Value::String(_) => "a string",
            serde_json::Value::Array(_) => "an array",
            serde_json::Value::Object(_) => "an object",
        };
        Self::NotAnObject(kind.to_string())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
