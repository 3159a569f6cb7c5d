//! Format detection for uploaded API definitions.
//!
//! Detection never fails: anything that cannot be recognized is reported as
//! [`DefinitionFormat::Unknown`] together with a reason. The checks run in a
//! fixed order and the first match wins:
//!
//! 1. file extension,
//! 2. a leading `{` or `[` that parses as JSON,
//! 3. a leading `#%RAML`, `# ` or `FORMAT:` marker,
//! 4. a YAML definition keyword at line start that parses as YAML,
//! 5. a plain JSON parse, then a YAML parse of a structured document.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::DefinitionFormat;
use super::yaml::is_structured;

static YAML_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(openapi|swagger|info|paths)\s*:").expect("valid YAML marker regex")
});

/// Outcome of detection, with the rule that decided it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub format: DefinitionFormat,
    pub reason: String,
}

impl Detection {
    fn new(format: DefinitionFormat, reason: impl Into<String>) -> Self {
        Self {
            format,
            reason: reason.into(),
        }
    }
}

/// Detect the format of `content`, using `filename` as a hint when present
pub fn detect(content: &str, filename: Option<&str>) -> DefinitionFormat {
    detect_with_reason(content, filename).format
}

/// Like [`detect`], but also explains which rule matched (or why none did)
pub fn detect_with_reason(content: &str, filename: Option<&str>) -> Detection {
    if let Some(format) = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .and_then(DefinitionFormat::from_extension)
    {
        return Detection::new(format, "file extension");
    }

    let trimmed = content.trim_start_matches('\u{feff}').trim_start();
    if trimmed.is_empty() {
        return Detection::new(DefinitionFormat::Unknown, "document is empty");
    }

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return Detection::new(DefinitionFormat::Json, "leading bracket with valid JSON");
    }

    if trimmed.starts_with("#%RAML") {
        return Detection::new(DefinitionFormat::Raml, "#%RAML header");
    }
    if trimmed.starts_with("# ") || trimmed.starts_with("FORMAT:") {
        return Detection::new(DefinitionFormat::Markdown, "markdown heading or FORMAT line");
    }

    if YAML_MARKER_RE.is_match(trimmed)
        && serde_yaml::from_str::<serde_yaml::Value>(trimmed).is_ok()
    {
        return Detection::new(DefinitionFormat::Yaml, "API keyword with valid YAML");
    }

    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Detection::new(DefinitionFormat::Json, "valid JSON");
    }

    match serde_yaml::from_str::<serde_yaml::Value>(trimmed) {
        Ok(value) if is_structured(&value) => {
            Detection::new(DefinitionFormat::Yaml, "valid structured YAML")
        }
        Ok(_) => Detection::new(
            DefinitionFormat::Unknown,
            "content parses as YAML but is not a structured mapping",
        ),
        Err(e) => Detection::new(
            DefinitionFormat::Unknown,
            format!("content is neither JSON nor YAML: {e}"),
        ),
    }
}
