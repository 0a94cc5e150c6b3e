//! Engine configuration surface.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration recognized by the resolution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory containing vibe-to-attribute mapping JSON files.
    pub vibes_data_dir: PathBuf,

    /// Minimum similarity score for a rule-based match to be trusted.
    pub similarity_threshold: f32,

    /// Maximum number of products returned by catalog filtering.
    pub max_results: usize,

    /// Product catalog CSV file.
    pub catalog_file: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vibes_data_dir: PathBuf::from("data/vibes"),
            similarity_threshold: 0.8,
            max_results: 5,
            catalog_file: PathBuf::from("data/apparels.csv"),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}
