// Bridge configuration

use bridge_types::ResponseMode;
use serde::{Deserialize, Serialize};

/// Name the factory function is installed under when a host asks for it
pub const DEFAULT_GLOBAL_NAME: &str = "NewPhase";

/// Settings shared by every host binding of a bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Global function name for the instance factory
    #[serde(alias = "globalName")]
    pub global_name: String,
    /// How adapter outcomes are rendered
    #[serde(alias = "responseMode")]
    pub response_mode: ResponseMode,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            global_name: DEFAULT_GLOBAL_NAME.to_string(),
            response_mode: ResponseMode::default(),
        }
    }
}

impl BridgeConfig {
    pub fn with_global_name(mut self, name: impl Into<String>) -> Self {
        self.global_name = name.into();
        self
    }

    pub fn with_response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.global_name, "NewPhase");
        assert_eq!(config.response_mode, ResponseMode::Tagged);
    }

    #[test]
    fn test_partial_deserialization() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"response_mode":"legacy"}"#).unwrap();
        assert_eq!(config.global_name, DEFAULT_GLOBAL_NAME);
        assert_eq!(config.response_mode, ResponseMode::Legacy);
    }

    #[test]
    fn test_camel_case_options() {
        let config: BridgeConfig =
            serde_json::from_str(r#"{"globalName":"MakePhase","responseMode":"tagged"}"#).unwrap();
        assert_eq!(config.global_name, "MakePhase");
        assert_eq!(config.response_mode, ResponseMode::Tagged);
    }
}
