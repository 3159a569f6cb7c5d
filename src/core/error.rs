//! Error handling for the mcp-forge library.
//!
//! This module defines the main error type `Error` used by the pipeline stages
//! and drivers, along with a convenient `Result` type alias. Non-fatal problems
//! (skipped endpoints, unresolved references) are not errors: they are
//! collected as [`Diagnostic`](super::Diagnostic)s instead.
//!
//! # Examples
//!
//! ```
//! use mcp_forge::core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::config("missing output directory"))
//! }
//! assert!(might_fail().is_err());
//! ```

use thiserror::Error;

use crate::definition::DefinitionFormat;

/// Result type for mcp-forge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mcp-forge operations
#[derive(Debug, Error)]
pub enum Error {
    /// The document format could not be determined
    #[error("Could not detect definition format: {reason}")]
    DetectionFailure { reason: String },

    /// The document was recognized but could not be parsed
    #[error("Failed to parse {format} definition: {reason}")]
    ParseFailure {
        format: DefinitionFormat,
        reason: String,
    },

    /// No generator backend exists for the requested language
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Generation aborted; no files were produced
    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    /// A server configuration document is structurally invalid
    #[error("Invalid server configuration: {0}")]
    InvalidServerConfig(String),

    /// A definition source could not be loaded
    #[error("Failed to load definition: {0}")]
    Load(String),

    /// Tool configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new detection failure
    pub fn detection<S: Into<String>>(reason: S) -> Self {
        Self::DetectionFailure {
            reason: reason.into(),
        }
    }

    /// Create a new parse failure for the given format
    pub fn parse<S: Into<String>>(format: DefinitionFormat, reason: S) -> Self {
        Self::ParseFailure {
            format,
            reason: reason.into(),
        }
    }

    /// Create a new load error
    pub fn load<S: Into<String>>(msg: S) -> Self {
        Self::Load(msg.into())
    }
}
