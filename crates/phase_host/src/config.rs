//! Host Configuration
//!
//! Loads `phase-host` settings from a TOML file.

use std::path::{Path, PathBuf};

use bridge_runtime::BridgeConfig;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "phase_host=info,bridge_runtime=info,bridge.js.console=info";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for the `phase-host` binary
///
/// ```toml
/// log_filter = "phase_host=debug"
///
/// [bridge]
/// global_name = "NewPhase"
/// response_mode = "legacy"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
    pub bridge: BridgeConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl HostConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: HostConfig = toml::from_str(&content)?;
        info!("Loaded host config from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
