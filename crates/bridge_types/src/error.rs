//! Call errors surfaced at the adapter boundary
//!
//! The `Display` text of each variant is the message legacy callers receive,
//! so the wording doubles as a wire format.

use serde::{Deserialize, Serialize};

use crate::{JsonKind, ParamType};

/// Machine-readable category of a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MethodNotFound,
    InvalidJson,
    ArgumentCount,
    MissingArguments,
    TypeMismatch,
    UnsupportedType,
    Serialization,
    Enumeration,
}

/// Errors that can occur while decoding, coercing, or encoding a call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CallError {
    #[error("Method {0} not found")]
    MethodNotFound(String),

    #[error("No arguments provided")]
    MissingArguments,

    #[error("Invalid JSON input: {0}")]
    InvalidJson(String),

    #[error("Expected {expected} parameters, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("Parameter {index}: expected {expected}, got {actual}")]
    TypeMismatch {
        index: usize,
        expected: ParamType,
        actual: JsonKind,
    },

    #[error("Parameter {index}: invalid list element type {actual}")]
    InvalidElement { index: usize, actual: JsonKind },

    #[error("Parameter {index}: invalid map key {key}")]
    InvalidMapKey { index: usize, key: String },

    #[error("Parameter {index}: invalid map value for key {key}: {actual}")]
    InvalidMapValue {
        index: usize,
        key: String,
        actual: JsonKind,
    },

    #[error("Parameter {index}: duration out of range: {ticks}")]
    DurationRange { index: usize, ticks: f64 },

    #[error("Parameter {index}: unsupported type {type_name}")]
    UnsupportedType { index: usize, type_name: String },

    #[error("Failed to marshal results: {0}")]
    Serialization(String),
}

impl CallError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CallError::MethodNotFound(_) => ErrorKind::MethodNotFound,
            CallError::MissingArguments => ErrorKind::MissingArguments,
            CallError::InvalidJson(_) => ErrorKind::InvalidJson,
            CallError::ArgumentCount { .. } => ErrorKind::ArgumentCount,
            CallError::TypeMismatch { .. }
            | CallError::InvalidElement { .. }
            | CallError::InvalidMapKey { .. }
            | CallError::InvalidMapValue { .. }
            | CallError::DurationRange { .. } => ErrorKind::TypeMismatch,
            CallError::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            CallError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// A host passed something other than a string as the argument
    ///
    /// `type_name` is the JS `typeof` name, except that `null` is named as such.
    pub fn non_string_argument(type_name: &str) -> Self {
        CallError::InvalidJson(format!(
            "expected a JSON-encoded string argument, got {}",
            type_name
        ))
    }
}

/// Self-enumeration failed while constructing an instance
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error getting methods: {0}")]
pub struct EnumerationError(pub String);

impl EnumerationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Enumeration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_messages() {
        assert_eq!(
            CallError::MethodNotFound("Add".to_string()).to_string(),
            "Method Add not found"
        );
        assert_eq!(CallError::MissingArguments.to_string(), "No arguments provided");
        assert_eq!(
            CallError::ArgumentCount { expected: 2, actual: 3 }.to_string(),
            "Expected 2 parameters, got 3"
        );
        assert_eq!(
            CallError::TypeMismatch {
                index: 1,
                expected: ParamType::Int,
                actual: JsonKind::String,
            }
            .to_string(),
            "Parameter 1: expected integer, got string"
        );
        assert_eq!(
            CallError::InvalidMapValue {
                index: 0,
                key: "3".to_string(),
                actual: JsonKind::Bool,
            }
            .to_string(),
            "Parameter 0: invalid map value for key 3: bool"
        );
        assert_eq!(
            EnumerationError("boom".to_string()).to_string(),
            "Error getting methods: boom"
        );
    }

    #[test]
    fn test_non_string_argument() {
        let err = CallError::non_string_argument("null");
        assert_eq!(err.kind(), ErrorKind::InvalidJson);
        assert_eq!(
            err.to_string(),
            "Invalid JSON input: expected a JSON-encoded string argument, got null"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            CallError::InvalidElement { index: 0, actual: JsonKind::Null }.kind(),
            ErrorKind::TypeMismatch
        );
        assert_eq!(
            CallError::UnsupportedType { index: 0, type_name: "u128".to_string() }.kind(),
            ErrorKind::UnsupportedType
        );
        assert_eq!(
            serde_json::to_value(ErrorKind::MethodNotFound).unwrap(),
            serde_json::json!("method_not_found")
        );
    }
}
