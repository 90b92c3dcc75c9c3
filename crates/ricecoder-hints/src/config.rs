//! Configuration loading for per-mode hint defaults
//!
//! A config file supplies the "provider-declared defaults" tier of option
//! resolution: a global `defaults` bag plus one bag per mode.
//!
//! ```yaml
//! defaults:
//!   closeOnUnfocus: false
//! modes:
//!   javascript:
//!     completeSingle: false
//!     globalScope: window
//! ```

use crate::error::{HintError, HintResult};
use crate::options::HintOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Per-mode option defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HintsConfig {
    /// Applied to every mode
    #[serde(default)]
    pub defaults: HintOptions,
    /// Mode-specific entries, layered over `defaults`
    #[serde(default)]
    pub modes: HashMap<String, HintOptions>,
}

impl HintsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: impl Into<String>, options: HintOptions) -> Self {
        self.modes.insert(mode.into(), options);
        self
    }

    /// Defaults for `mode`: the mode entry over the global defaults
    pub fn defaults_for(&self, mode: Option<&str>) -> HintOptions {
        match mode.and_then(|mode| self.modes.get(mode)) {
            Some(options) => self.defaults.merged(options),
            None => self.defaults.clone(),
        }
    }
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Format implied by a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Some(ConfigFormat::Yaml),
            Some("json") => Some(ConfigFormat::Json),
            _ => None,
        }
    }
}

/// Hints configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file
    pub fn load_from_yaml(path: &Path) -> HintResult<HintsConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, ConfigFormat::Yaml)
    }

    /// Load configuration from a JSON file
    pub fn load_from_json(path: &Path) -> HintResult<HintsConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, ConfigFormat::Json)
    }

    /// Load configuration from a file, picking the format by extension
    pub fn load_from_path(path: &Path) -> HintResult<HintsConfig> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            HintError::ConfigError(format!("Unsupported configuration file: {}", path.display()))
        })?;
        let content = std::fs::read_to_string(path)?;
        Self::load_from_string(&content, format)
    }

    /// Load configuration from a string
    pub fn load_from_string(content: &str, format: ConfigFormat) -> HintResult<HintsConfig> {
        let config: HintsConfig = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Json => serde_json::from_str(content)?,
        };
        Self::validate_config(&config)?;
        Ok(config)
    }

    fn validate_config(config: &HintsConfig) -> HintResult<()> {
        if config.modes.keys().any(|mode| mode.trim().is_empty()) {
            return Err(HintError::ConfigError("Mode name cannot be empty".to_string()));
        }

        Ok(())
    }
}
