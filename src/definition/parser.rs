//! Definition parsing: text plus detected format to a [`ParsedTree`].
//!
//! JSON and YAML produce the same object graph. RAML and Markdown produce
//! their own lightweight trees. There is no retry with another format here:
//! a document detected as JSON that fails to parse is a parse failure.

use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use super::blueprint::{BlueprintDocument, parse_blueprint};
use super::raml::{RamlDocument, parse_raml};
use super::yaml::yaml_to_json;
use super::DefinitionFormat;
use crate::core::{Diagnostics, Error, Result};

/// Parsed form of a definition, one variant per family of source formats
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "tree", rename_all = "lowercase")]
pub enum ParsedTree {
    /// OpenAPI / Swagger object graph from JSON or YAML
    Document(JsonValue),
    Raml(RamlDocument),
    Blueprint(BlueprintDocument),
}

/// Descriptive fields of the definition itself
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionInfo {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    /// Base URL of the described API, when the definition declares one
    pub base_url: Option<String>,
}

impl ParsedTree {
    /// Title, version, description and base URL declared by the definition
    pub fn info(&self) -> DefinitionInfo {
        match self {
            ParsedTree::Document(root) => document_info(root),
            ParsedTree::Raml(raml) => DefinitionInfo {
                title: raml.title.clone(),
                version: raml.version.clone(),
                description: raml.description.clone(),
                base_url: raml.base_uri.as_ref().map(|uri| match &raml.version {
                    Some(version) => uri.replace("{version}", version),
                    None => uri.clone(),
                }),
            },
            ParsedTree::Blueprint(blueprint) => DefinitionInfo {
                title: blueprint.title.clone(),
                version: None,
                description: blueprint.description.clone(),
                base_url: blueprint.host.clone(),
            },
        }
    }
}

/// Parse `content` as `format`
pub fn parse(
    content: &str,
    format: DefinitionFormat,
    diagnostics: &mut Diagnostics,
) -> Result<ParsedTree> {
    debug!(%format, bytes = content.len(), "Parsing definition");
    let content = content.trim_start_matches('\u{feff}');

    match format {
        DefinitionFormat::Json => {
            let root: JsonValue = serde_json::from_str(content)
                .map_err(|e| Error::parse(format, e.to_string()))?;
            ensure_mapping(format, root)
        }
        DefinitionFormat::Yaml => {
            let root: serde_yaml::Value = serde_yaml::from_str(content)
                .map_err(|e| Error::parse(format, e.to_string()))?;
            ensure_mapping(format, yaml_to_json(root))
        }
        DefinitionFormat::Raml => Ok(ParsedTree::Raml(parse_raml(content, diagnostics))),
        DefinitionFormat::Markdown => Ok(ParsedTree::Blueprint(parse_blueprint(
            content,
            diagnostics,
        ))),
        DefinitionFormat::Unknown => Err(Error::parse(
            format,
            "cannot parse a document of unknown format",
        )),
    }
}

fn ensure_mapping(format: DefinitionFormat, root: JsonValue) -> Result<ParsedTree> {
    if root.is_object() {
        Ok(ParsedTree::Document(root))
    } else {
        Err(Error::parse(format, "document root is not a mapping"))
    }
}

fn document_info(root: &JsonValue) -> DefinitionInfo {
    let info = root.get("info");
    let text = |node: Option<&JsonValue>, key: &str| {
        node.and_then(|n| n.get(key))
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    };

    // OpenAPI 3 `servers`, else Swagger 2 `host` + `basePath`
    let base_url = root
        .pointer("/servers/0/url")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .or_else(|| {
            let host = root.get("host").and_then(JsonValue::as_str)?;
            let scheme = root
                .pointer("/schemes/0")
                .and_then(JsonValue::as_str)
                .unwrap_or("https");
            let base_path = root.get("basePath").and_then(JsonValue::as_str).unwrap_or("");
            Some(format!("{scheme}://{host}{base_path}"))
        });

    DefinitionInfo {
        title: text(info, "title"),
        version: info.and_then(|i| i.get("version")).and_then(|v| match v {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }),
        description: text(info, "description"),
        base_url,
    }
}
