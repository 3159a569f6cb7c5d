//! RAML resource extraction.
//!
//! RAML documents are YAML with a `#%RAML` comment header, so the full YAML
//! parser is tried first and the resource tree is read from the resulting
//! object graph. Documents the YAML layer rejects (custom tags, tabs, broken
//! indentation) go through an indentation scanner that only recovers resource
//! paths and method keys.

use serde::Serialize;
use serde_json::Value as JsonValue;

use super::yaml::yaml_to_json;
use crate::core::{Diagnostics, Stage};

const RAML_METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options", "trace"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RamlDocument {
    pub title: Option<String>,
    pub version: Option<String>,
    pub base_uri: Option<String>,
    pub description: Option<String>,
    pub resources: Vec<RamlResource>,
    /// Set when only the indentation scanner could read the document
    pub partial: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RamlResource {
    /// Relative URI, e.g. `/{petId}` for a nested resource
    pub relative_uri: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub uri_parameters: Vec<RamlParameter>,
    pub methods: Vec<RamlMethod>,
    pub children: Vec<RamlResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RamlMethod {
    /// Lower-case method key as written in the document
    pub method: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub query_parameters: Vec<RamlParameter>,
    pub body: Option<JsonValue>,
    pub responses: Vec<RamlResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RamlParameter {
    pub name: String,
    pub type_name: Option<String>,
    pub required: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RamlResponse {
    pub code: String,
    pub description: Option<String>,
    pub schema: Option<JsonValue>,
}

/// Parse a RAML document. Never fails: at worst the scanner returns an empty
/// resource list and a warning is recorded.
pub fn parse_raml(content: &str, diagnostics: &mut Diagnostics) -> RamlDocument {
    match serde_yaml::from_str::<serde_yaml::Value>(content) {
        Ok(value) => {
            let tree = yaml_to_json(value);
            if tree.is_object() {
                return from_tree(&tree);
            }
            diagnostics.warn(
                Stage::Parsing,
                "RAML document root is not a mapping, falling back to line scanning",
            );
        }
        Err(e) => diagnostics.warn(
            Stage::Parsing,
            format!("RAML document is not valid YAML ({e}), falling back to line scanning"),
        ),
    }

    let document = scan_lines(content);
    diagnostics.warn(
        Stage::Parsing,
        format!(
            "partial RAML extraction: recovered {} resource(s) without parameters or responses",
            document.resources.len()
        ),
    );
    document
}

fn from_tree(tree: &JsonValue) -> RamlDocument {
    RamlDocument {
        title: string_field(tree, "title"),
        version: scalar_text(tree.get("version")),
        base_uri: string_field(tree, "baseUri"),
        description: string_field(tree, "description"),
        resources: resources_of(tree),
        partial: false,
    }
}

fn resources_of(node: &JsonValue) -> Vec<RamlResource> {
    let Some(object) = node.as_object() else {
        return Vec::new();
    };
    object
        .iter()
        .filter(|(key, _)| key.starts_with('/'))
        .map(|(key, value)| resource_from(key, value))
        .collect()
}

fn resource_from(relative_uri: &str, node: &JsonValue) -> RamlResource {
    let methods = node
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter(|(key, _)| RAML_METHODS.contains(&key.as_str()))
                .map(|(key, value)| method_from(key, value))
                .collect()
        })
        .unwrap_or_default();

    RamlResource {
        relative_uri: relative_uri.to_string(),
        display_name: string_field(node, "displayName"),
        description: string_field(node, "description"),
        uri_parameters: parameters_of(node.get("uriParameters")),
        methods,
        children: resources_of(node),
    }
}

fn method_from(method: &str, node: &JsonValue) -> RamlMethod {
    RamlMethod {
        method: method.to_string(),
        display_name: string_field(node, "displayName"),
        description: string_field(node, "description"),
        query_parameters: parameters_of(node.get("queryParameters")),
        body: node.get("body").and_then(body_schema),
        responses: responses_of(node.get("responses")),
    }
}

fn parameters_of(node: Option<&JsonValue>) -> Vec<RamlParameter> {
    let Some(object) = node.and_then(JsonValue::as_object) else {
        return Vec::new();
    };
    object
        .iter()
        .map(|(name, spec)| match spec {
            // `id: integer` shorthand
            JsonValue::String(type_name) => RamlParameter {
                name: name.clone(),
                type_name: Some(type_name.clone()),
                ..Default::default()
            },
            _ => RamlParameter {
                name: name.clone(),
                type_name: string_field(spec, "type"),
                required: spec.get("required").and_then(JsonValue::as_bool),
                description: string_field(spec, "description"),
            },
        })
        .collect()
}

fn responses_of(node: Option<&JsonValue>) -> Vec<RamlResponse> {
    let Some(object) = node.and_then(JsonValue::as_object) else {
        return Vec::new();
    };
    object
        .iter()
        .map(|(code, spec)| RamlResponse {
            code: code.clone(),
            description: string_field(spec, "description"),
            schema: spec.get("body").and_then(body_schema),
        })
        .collect()
}

/// Pick the schema of a `body` node, preferring `application/json`
fn body_schema(body: &JsonValue) -> Option<JsonValue> {
    let object = body.as_object()?;
    let typed = |node: &JsonValue| {
        node.get("schema")
            .or_else(|| node.get("type"))
            .or_else(|| node.get("properties").map(|_| node))
            .cloned()
    };

    if let Some(json) = object.get("application/json") {
        return typed(json);
    }
    if let Some(direct) = typed(body) {
        return Some(direct);
    }
    object.values().find_map(typed)
}

fn string_field(node: &JsonValue, key: &str) -> Option<String> {
    node.get(key)
        .and_then(JsonValue::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn scalar_text(node: Option<&JsonValue>) -> Option<String> {
    match node? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Indentation-based recovery: resource keys (`/path:`) and method keys only
fn scan_lines(content: &str) -> RamlDocument {
    let mut document = RamlDocument {
        partial: true,
        ..Default::default()
    };
    // (indent, absolute path) of the currently open resources
    let mut stack: Vec<(usize, String)> = Vec::new();
    let mut flat: Vec<RamlResource> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - line.trim_start().len();
        let Some(key) = trimmed.strip_suffix(':').or_else(|| {
            trimmed
                .split_once(": ")
                .filter(|_| indent == 0)
                .map(|(key, _)| key)
        }) else {
            continue;
        };

        if indent == 0 && key == "title" {
            if let Some((_, value)) = trimmed.split_once(':') {
                document.title = Some(value.trim().to_string()).filter(|t| !t.is_empty());
            }
            continue;
        }

        if key.starts_with('/') {
            while stack.last().is_some_and(|(open, _)| *open >= indent) {
                stack.pop();
            }
            let parent = stack.last().map(|(_, path)| path.as_str()).unwrap_or("");
            let path = format!("{parent}{key}");
            stack.push((indent, path.clone()));
            flat.push(RamlResource {
                relative_uri: path,
                ..Default::default()
            });
        } else if RAML_METHODS.contains(&key) {
            while stack.last().is_some_and(|(open, _)| *open >= indent) {
                stack.pop();
            }
            let Some((_, path)) = stack.last() else {
                continue;
            };
            if let Some(resource) = flat.iter_mut().rev().find(|r| &r.relative_uri == path) {
                resource.methods.push(RamlMethod {
                    method: key.to_string(),
                    ..Default::default()
                });
            }
        }
    }

    document.resources = flat;
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETS: &str = r#"#%RAML 1.0
title: Pet Store
version: v1
baseUri: https://api.example.com/{version}
/pets:
  displayName: Pets
  get:
    description: List pets
    queryParameters:
      limit:
        type: integer
        required: false
    responses:
      200:
        body:
          application/json:
            type: array
  post:
    body:
      application/json:
        type: object
  /{petId}:
    uriParameters:
      petId: integer
    get:
      responses:
        200:
          description: A pet
        404:
          description: Not found
"#;

    #[test]
    fn test_parses_resource_tree() {
        let mut diagnostics = Diagnostics::new();
        let document = parse_raml(PETS, &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert!(!document.partial);
        assert_eq!(document.title.as_deref(), Some("Pet Store"));
        assert_eq!(document.version.as_deref(), Some("v1"));
        assert_eq!(document.resources.len(), 1);

        let pets = &document.resources[0];
        assert_eq!(pets.relative_uri, "/pets");
        assert_eq!(pets.display_name.as_deref(), Some("Pets"));
        let methods: Vec<_> = pets.methods.iter().map(|m| m.method.as_str()).collect();
        assert_eq!(methods, vec!["get", "post"]);
        assert_eq!(pets.methods[0].query_parameters[0].name, "limit");
        assert_eq!(pets.methods[0].query_parameters[0].required, Some(false));
        assert_eq!(pets.methods[0].responses[0].code, "200");
        assert_eq!(
            pets.methods[0].responses[0].schema,
            Some(JsonValue::String("array".to_string()))
        );

        let by_id = &pets.children[0];
        assert_eq!(by_id.relative_uri, "/{petId}");
        assert_eq!(by_id.uri_parameters[0].type_name.as_deref(), Some("integer"));
        let codes: Vec<_> = by_id.methods[0].responses.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["200", "404"]);
    }

    #[test]
    fn test_falls_back_to_line_scanning() {
        // The unclosed flow sequence is rejected by YAML
        let content = "#%RAML 1.0\ntitle: Broken\n/users:\n  description: [unclosed\n  get:\n/orders:\n  /{id}:\n    delete:\n";
        let mut diagnostics = Diagnostics::new();
        let document = parse_raml(content, &mut diagnostics);

        assert!(document.partial);
        assert!(diagnostics.has_warnings());
        assert_eq!(document.title.as_deref(), Some("Broken"));
        let paths: Vec<_> = document
            .resources
            .iter()
            .map(|r| r.relative_uri.as_str())
            .collect();
        assert_eq!(paths, vec!["/users", "/orders", "/orders/{id}"]);
        assert_eq!(document.resources[0].methods[0].method, "get");
        assert_eq!(document.resources[2].methods[0].method, "delete");
    }
}
