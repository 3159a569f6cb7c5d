//! Tool configuration for the mcp-forge driver.
//!
//! Configuration is read from TOML. Lookup order: an explicit path, then the
//! `MCP_FORGE_CONFIG` environment variable, then
//! `<config dir>/mcp-forge/config.toml`. A missing file yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{Error, Result};
use crate::generation::Language;

/// Environment variable pointing at a configuration file
pub const CONFIG_ENV_VAR: &str = "MCP_FORGE_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForgeConfig {
    pub generation: GenerationSettings,
    pub validator: ValidatorSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Language used when the command line does not name one
    pub default_language: Language,
    /// Directory generated projects are written under
    pub output_dir: PathBuf,
    /// Stamp `deploy.json` with the generation time
    pub stamp_metadata: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_language: Language::TypeScript,
            output_dir: PathBuf::from("generated"),
            stamp_metadata: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    pub timeout_secs: u64,
    pub api_key_header: String,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            api_key_header: crate::server::DEFAULT_API_KEY_HEADER.to_string(),
        }
    }
}

impl ValidatorSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ForgeConfig {
    /// Parse a configuration document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file; the file must exist
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Resolve the configuration using the documented lookup order
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "Loading config from explicit path");
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            debug!(%path, "Loading config from {CONFIG_ENV_VAR}");
            return Self::from_file(Path::new(&path));
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "Loading config from user config dir");
                Self::from_file(&path)
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// `<config dir>/mcp-forge/config.toml`, when the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("mcp-forge").join("config.toml"))
    }

    fn validate(&self) -> Result<()> {
        if self.validator.timeout_secs == 0 {
            return Err(Error::config("validator.timeout_secs must be greater than 0"));
        }
        if self.validator.api_key_header.trim().is_empty() {
            return Err(Error::config("validator.api_key_header must not be empty"));
        }
        if self.generation.output_dir.as_os_str().is_empty() {
            return Err(Error::config("generation.output_dir must not be empty"));
        }
        Ok(())
    }
}
