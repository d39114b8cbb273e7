//! Configuration for the per-frame update core
//!
//! Tuning knobs that differ between target platforms live here so that
//! shipping builds can adjust them from a TOML file instead of a rebuild.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Scene-level tuning for the update pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Rescale inverse-transpose world matrices by `1/sqrt(|det|)` before
    /// upload. Keeps the matrix magnitude near unity, which prevents
    /// precision collapse in the normal path on some mobile GPU drivers.
    /// Platforms with a well-behaved native path can turn this off.
    pub rescale_normal_matrix: bool,

    /// Model slots preallocated by a render scene.
    pub model_capacity: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            rescale_normal_matrix: true,
            model_capacity: 256,
        }
    }
}

impl SceneConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}
