//! Method and parameter descriptions
//!
//! These types describe what a wrapped object exposes. They are produced by
//! the runtime's method table and returned to JavaScript by self-enumeration.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Instance Identifiers
// ─────────────────────────────────────────────────────────────────────────────

/// Unique identifier of one constructed wrapped-object instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub uuid::Uuid);

impl InstanceId {
    /// Create a new unique instance ID
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameter Types
// ─────────────────────────────────────────────────────────────────────────────

/// Statically declared type of an exposed method's parameter
///
/// Every variant except `Unsupported` has a JSON coercion rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum ParamType {
    /// Any integer width; JSON numbers are truncated toward zero
    Int,
    /// `f32` or `f64`
    Float,
    Bool,
    String,
    /// Sequence of integers
    IntList,
    /// Mapping from integer key to `f64` value
    IntFloatMap,
    /// Duration given as a raw nanosecond tick count
    Duration,
    /// A declared type with no coercion rule (carries the Rust type name)
    Unsupported(String),
}

impl ParamType {
    /// Whether JSON arguments can be coerced into this type
    pub fn is_supported(&self) -> bool {
        !matches!(self, ParamType::Unsupported(_))
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamType::Int => write!(f, "integer"),
            ParamType::Float => write!(f, "float"),
            ParamType::Bool => write!(f, "bool"),
            ParamType::String => write!(f, "string"),
            ParamType::IntList => write!(f, "integer list"),
            ParamType::IntFloatMap => write!(f, "integer-keyed float map"),
            ParamType::Duration => write!(f, "duration"),
            ParamType::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Shape of an untyped JSON value, as named in coercion errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    /// Classify a JSON value
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonKind::Null,
            serde_json::Value::Bool(_) => JsonKind::Bool,
            serde_json::Value::Number(_) => JsonKind::Number,
            serde_json::Value::String(_) => JsonKind::String,
            serde_json::Value::Array(_) => JsonKind::Array,
            serde_json::Value::Object(_) => JsonKind::Object,
        }
    }
}

impl std::fmt::Display for JsonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonKind::Null => write!(f, "null"),
            JsonKind::Bool => write!(f, "bool"),
            JsonKind::Number => write!(f, "number"),
            JsonKind::String => write!(f, "string"),
            JsonKind::Array => write!(f, "array"),
            JsonKind::Object => write!(f, "object"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Method Info
// ─────────────────────────────────────────────────────────────────────────────

/// Self-description of one exposed method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    /// Name the method is exposed under
    pub method_name: String,
    /// Declared parameter types, in order
    #[serde(default)]
    pub params: Vec<ParamType>,
    /// Human-readable description (from doc comments)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MethodInfo {
    /// Create a description for a method with no parameters
    pub fn new(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            params: Vec::new(),
            description: None,
        }
    }

    /// Set the declared parameter types
    pub fn with_params(mut self, params: Vec<ParamType>) -> Self {
        self.params = params;
        self
    }

    /// Add a description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_type_display() {
        assert_eq!(ParamType::Int.to_string(), "integer");
        assert_eq!(ParamType::IntFloatMap.to_string(), "integer-keyed float map");
        assert_eq!(
            ParamType::Unsupported("phase::Mode".to_string()).to_string(),
            "phase::Mode"
        );
        assert!(!ParamType::Unsupported("x".to_string()).is_supported());
        assert!(ParamType::Duration.is_supported());
    }

    #[test]
    fn test_json_kind() {
        assert_eq!(JsonKind::of(&json!(null)), JsonKind::Null);
        assert_eq!(JsonKind::of(&json!(1.5)), JsonKind::Number);
        assert_eq!(JsonKind::of(&json!([1])), JsonKind::Array);
        assert_eq!(JsonKind::of(&json!({"a": 1})).to_string(), "object");
    }

    #[test]
    fn test_method_info_serialization() {
        let info = MethodInfo::new("Add")
            .with_params(vec![ParamType::Int, ParamType::Int])
            .with_description("Add two integers.");

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            json!({
                "methodName": "Add",
                "params": [{"type": "int"}, {"type": "int"}],
                "description": "Add two integers."
            })
        );
        assert_eq!(info.arity(), 2);
    }

    #[test]
    fn test_unsupported_param_serialization() {
        let value = serde_json::to_value(ParamType::Unsupported("u128".to_string())).unwrap();
        assert_eq!(value, json!({"type": "unsupported", "name": "u128"}));
    }

    #[test]
    fn test_instance_ids_are_unique() {
        assert_ne!(InstanceId::new(), InstanceId::new());
    }
}
