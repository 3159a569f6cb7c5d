//! Endpoint normalization: any [`ParsedTree`] to canonical [`Endpoint`]s.
//!
//! Format-specific extraction lives in the sibling modules; this module applies
//! the rules every endpoint shares: a leading slash on the path, unique
//! parameter names, a stable id and the default capability kind.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::blueprint::blueprint_endpoints;
use super::classifier::classify;
use super::ids::IdAllocator;
use super::openapi::OpenApiNormalizer;
use super::raml::raml_endpoints;
use super::Endpoint;
use crate::core::{Diagnostics, Stage};
use crate::definition::ParsedTree;

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}?&/]+)\}").expect("valid placeholder regex"));

/// Extract canonical endpoints from a parsed definition
pub fn normalize(tree: &ParsedTree, diagnostics: &mut Diagnostics) -> Vec<Endpoint> {
    let extracted = match tree {
        ParsedTree::Document(root) => OpenApiNormalizer::new(root).endpoints(diagnostics),
        ParsedTree::Raml(document) => raml_endpoints(document, diagnostics),
        ParsedTree::Blueprint(document) => blueprint_endpoints(document, diagnostics),
    };

    let mut ids = IdAllocator::new();
    let mut seen = HashSet::new();
    let endpoints: Vec<Endpoint> = extracted
        .into_iter()
        .map(|mut endpoint| {
            if !endpoint.path.starts_with('/') {
                diagnostics.warn_at(
                    Stage::Normalization,
                    endpoint.label(),
                    "path has no leading slash; one was added",
                );
                endpoint.path = format!("/{}", endpoint.path);
            }
            dedupe_parameters(&mut endpoint, diagnostics);

            if !seen.insert((endpoint.method, endpoint.path.clone())) {
                diagnostics.info_at(
                    Stage::Normalization,
                    endpoint.label(),
                    "operation declared more than once; each copy gets its own id",
                );
            }
            endpoint.id = ids.allocate(endpoint.method, &endpoint.path);
            endpoint.mcp_type = classify(&endpoint);
            endpoint
        })
        .collect();

    if endpoints.is_empty() {
        diagnostics.warn(Stage::Normalization, "no endpoints found in definition");
    }
    debug!(count = endpoints.len(), "Normalized endpoints");
    endpoints
}

/// Names of `{param}` placeholders in a path, in order of appearance
pub fn path_placeholders(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(path) {
        let name = caps[1].trim().to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn dedupe_parameters(endpoint: &mut Endpoint, diagnostics: &mut Diagnostics) {
    let mut names = HashSet::new();
    let label = endpoint.label();
    endpoint.parameters.retain(|parameter| {
        if names.insert(parameter.name.clone()) {
            true
        } else {
            diagnostics.warn_at(
                Stage::Normalization,
                label.clone(),
                format!("duplicate parameter `{}` dropped", parameter.name),
            );
            false
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{EndpointParameter, HttpMethod, McpType, ParameterLocation, ValueType, endpoint_id};
    use crate::definition::{BlueprintAction, BlueprintDocument};
    use serde_json::json;

    #[test]
    fn test_ids_and_classification_are_filled() {
        let tree = ParsedTree::Document(json!({
            "openapi": "3.0.0",
            "paths": {"/pets": {"get": {}, "post": {}}}
        }));
        let mut diagnostics = Diagnostics::new();
        let endpoints = normalize(&tree, &mut diagnostics);

        assert_eq!(endpoints[0].id, endpoint_id(HttpMethod::Get, "/pets", 0));
        assert_eq!(endpoints[0].mcp_type, McpType::Resource);
        assert_eq!(endpoints[1].mcp_type, McpType::Tool);
        assert!(endpoints.iter().all(|e| e.selected));
    }

    #[test]
    fn test_normalization_is_stable() {
        let tree = ParsedTree::Document(json!({
            "swagger": "2.0",
            "paths": {"/a": {"get": {}}, "/b/{id}": {"put": {}, "delete": {}}}
        }));
        let first = normalize(&tree, &mut Diagnostics::new());
        let second = normalize(&tree, &mut Diagnostics::new());
        assert_eq!(first, second);
    }

    #[test]
    fn test_duplicate_operations_get_distinct_ids() {
        let tree = ParsedTree::Blueprint(BlueprintDocument {
            actions: vec![
                BlueprintAction {
                    method: "GET".to_string(),
                    uri_template: "/pets".to_string(),
                    ..Default::default()
                },
                BlueprintAction {
                    method: "GET".to_string(),
                    uri_template: "/pets".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let mut diagnostics = Diagnostics::new();
        let endpoints = normalize(&tree, &mut diagnostics);

        assert_eq!(endpoints.len(), 2);
        assert_ne!(endpoints[0].id, endpoints[1].id);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_missing_leading_slash_is_fixed() {
        let tree = ParsedTree::Document(json!({
            "openapi": "3.0.0",
            "paths": {"pets": {"get": {}}}
        }));
        let mut diagnostics = Diagnostics::new();
        let endpoints = normalize(&tree, &mut diagnostics);
        assert_eq!(endpoints[0].path, "/pets");
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn test_duplicate_parameter_names_are_dropped() {
        let mut endpoint = Endpoint::new(HttpMethod::Get, "/pets");
        let parameter = EndpointParameter {
            name: "limit".to_string(),
            value_type: ValueType::Integer,
            location: ParameterLocation::Query,
            required: false,
            description: String::new(),
        };
        endpoint.parameters = vec![parameter.clone(), parameter];
        let mut diagnostics = Diagnostics::new();
        dedupe_parameters(&mut endpoint, &mut diagnostics);
        assert_eq!(endpoint.parameters.len(), 1);
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn test_empty_definition_warns() {
        let tree = ParsedTree::Document(json!({"openapi": "3.0.0", "paths": {}}));
        let mut diagnostics = Diagnostics::new();
        assert!(normalize(&tree, &mut diagnostics).is_empty());
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn test_path_placeholders() {
        assert_eq!(
            path_placeholders("/users/{userId}/posts/{postId}"),
            vec!["userId", "postId"]
        );
        assert!(path_placeholders("/pets{?limit}").is_empty());
    }
}
