//! Source document types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Format of an API definition document as seen by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionFormat {
    Json,
    Yaml,
    Raml,
    Markdown,
    Unknown,
}

impl DefinitionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionFormat::Json => "json",
            DefinitionFormat::Yaml => "yaml",
            DefinitionFormat::Raml => "raml",
            DefinitionFormat::Markdown => "markdown",
            DefinitionFormat::Unknown => "unknown",
        }
    }

    /// Format implied by a file extension, compared case-insensitively
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(DefinitionFormat::Json),
            "yaml" | "yml" => Some(DefinitionFormat::Yaml),
            "raml" => Some(DefinitionFormat::Raml),
            "md" | "markdown" | "apib" => Some(DefinitionFormat::Markdown),
            _ => None,
        }
    }
}

impl fmt::Display for DefinitionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An uploaded definition: the text plus the name it arrived under, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDefinition {
    pub content: String,
    pub filename: Option<String>,
}

impl RawDefinition {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}
