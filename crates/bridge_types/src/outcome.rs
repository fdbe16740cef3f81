//! Rendering of call outcomes for the host

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{CallError, EnumerationError, ErrorKind};

/// Outcome of one adapter call: the ordered result list, or the failure
pub type CallResult = Result<Vec<Value>, CallError>;

/// How call outcomes are rendered into the string handed back to JavaScript
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Bare JSON array on success, plain message on failure
    Legacy,
    /// Discriminated envelope: `{"ok":true,"value":[...]}` or
    /// `{"ok":false,"error":{"kind":...,"message":...}}`
    #[default]
    Tagged,
}

impl ResponseMode {
    /// Render a call outcome
    pub fn render(self, result: &CallResult) -> String {
        match self {
            ResponseMode::Legacy => match result {
                Ok(values) if values.is_empty() => "[]".to_string(),
                Ok(values) => serde_json::to_string(values)
                    .unwrap_or_else(|e| CallError::Serialization(e.to_string()).to_string()),
                Err(err) => err.to_string(),
            },
            ResponseMode::Tagged => {
                let response = Response::from_result(result);
                serde_json::to_string(&response)
                    .unwrap_or_else(|e| CallError::Serialization(e.to_string()).to_string())
            }
        }
    }

    /// Render a self-enumeration failure
    ///
    /// Legacy callers get the plain message; tagged callers get a failure
    /// envelope of kind `enumeration`.
    pub fn render_enumeration_error(self, err: &EnumerationError) -> String {
        match self {
            ResponseMode::Legacy => err.to_string(),
            ResponseMode::Tagged => {
                let response = Response::failure(err.kind(), err.to_string());
                serde_json::to_string(&response)
                    .unwrap_or_else(|e| CallError::Serialization(e.to_string()).to_string())
            }
        }
    }
}

/// Error payload of a tagged response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

/// Tagged response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    /// Successful response carrying the result list
    pub fn success(values: Vec<Value>) -> Self {
        Self {
            ok: true,
            value: Some(values),
            error: None,
        }
    }

    /// Failed response
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: None,
            error: Some(ErrorBody {
                kind,
                message: message.into(),
            }),
        }
    }

    /// Build the envelope for a call outcome
    pub fn from_result(result: &CallResult) -> Self {
        match result {
            Ok(values) => Self::success(values.clone()),
            Err(err) => Self::failure(err.kind(), err.to_string()),
        }
    }

    /// Parse a tagged response string
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
