//! Settings for the tool subsystem.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tool subsystem settings. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Shape given to newly created tools.
    pub default_shape: String,
    /// Unit shown next to tool sizes.
    pub unit: String,
    /// Reject manual tool id edits that collide with another tool.
    pub enforce_unique_ids: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_shape: "flat_bottom".to_string(),
            unit: "mm".to_string(),
            enforce_unique_ids: true,
        }
    }
}

impl ToolsConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
