//! Application configuration loaded from a TOML file.
//!
//! Every field has a default so encfm works without a config file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::from_io(e, path))?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }
}

/// Browsing and conversion preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory to open at startup. Empty means the process working
    /// directory.
    #[serde(default)]
    pub start_dir: String,
    /// Conversion target preselected in the encoding picker. Must be one of
    /// the supported labels.
    #[serde(default = "default_encoding")]
    pub default_encoding: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            start_dir: String::new(),
            default_encoding: default_encoding(),
        }
    }
}

/// Frontend behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Ask for confirmation before rewriting files.
    #[serde(default = "default_true")]
    pub confirm_convert: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            confirm_convert: default_true(),
        }
    }
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_true() -> bool {
    true
}
