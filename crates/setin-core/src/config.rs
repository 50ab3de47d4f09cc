//! Expansion configuration.
//!
//! [`ExpandConfig`] controls how a Setiner treats failures across the paths of
//! one call and whether it may delegate to a handler registry. It is plain
//! serde data, so it can live in an application's TOML config:
//!
//! ```toml
//! error_handling = "collect"
//! registry_fallback = true
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when one of several requested paths fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandling {
    /// Stop on first error.
    #[default]
    FailFast,
    /// Attempt every path and return the failures together.
    Collect,
}

/// Configuration for a Setiner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpandConfig {
    /// Failure policy across the paths of one call.
    pub error_handling: ErrorHandling,
    /// Whether `-` steps that no tester handles may go to a handler registry.
    pub registry_fallback: bool,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self {
            error_handling: ErrorHandling::FailFast,
            registry_fallback: true,
        }
    }
}

impl ExpandConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading expansion config");
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Builder: set the error handling policy.
    pub fn with_error_handling(mut self, handling: ErrorHandling) -> Self {
        self.error_handling = handling;
        self
    }

    /// Builder: enable or disable registry fallback.
    pub fn with_registry_fallback(mut self, enabled: bool) -> Self {
        self.registry_fallback = enabled;
        self
    }
}
