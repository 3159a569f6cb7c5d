//! API Blueprint actions to endpoints

use once_cell::sync::Lazy;
use regex::Regex;

use super::normalizer::path_placeholders;
use super::{Endpoint, EndpointParameter, EndpointResponse, HttpMethod, ParameterLocation, ValueType};
use crate::core::{Diagnostics, Stage};
use crate::definition::{BlueprintAction, BlueprintDocument};

/// `{?a,b}` and `{&c}` URI template expansions
static QUERY_EXPANSION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[?&]([^}]*)\}").expect("valid query expansion regex"));

pub(super) fn blueprint_endpoints(
    document: &BlueprintDocument,
    diagnostics: &mut Diagnostics,
) -> Vec<Endpoint> {
    document
        .actions
        .iter()
        .filter_map(|action| {
            let Ok(method) = action.method.parse::<HttpMethod>() else {
                diagnostics.info_at(
                    Stage::Normalization,
                    format!("{} {}", action.method, action.uri_template),
                    "method is not exposed over MCP, skipped",
                );
                return None;
            };
            Some(endpoint_from(action, method))
        })
        .collect()
}

/// Split a URI template into the plain path and its query expansion names
fn split_uri_template(template: &str) -> (String, Vec<String>) {
    let query = QUERY_EXPANSION_RE
        .captures_iter(template)
        .flat_map(|caps| {
            caps[1]
                .split(',')
                .map(|name| name.trim().trim_end_matches('*').to_string())
                .filter(|name| !name.is_empty())
                .collect::<Vec<_>>()
        })
        .collect();
    let path = QUERY_EXPANSION_RE.replace_all(template, "").into_owned();
    (path, query)
}

fn endpoint_from(action: &BlueprintAction, method: HttpMethod) -> Endpoint {
    let (path, query_names) = split_uri_template(&action.uri_template);
    let placeholders = path_placeholders(&path);

    let mut endpoint = Endpoint::new(method, path);
    endpoint.summary = action.name.clone();
    endpoint.description = action.description.clone();
    endpoint.tags = action.group.iter().cloned().collect();

    for declared in &action.parameters {
        let location = declared
            .location
            .as_deref()
            .and_then(|l| l.parse::<ParameterLocation>().ok())
            .unwrap_or(if placeholders.contains(&declared.name) {
                ParameterLocation::Path
            } else {
                ParameterLocation::Query
            });
        endpoint.parameters.push(EndpointParameter {
            name: declared.name.clone(),
            value_type: declared
                .type_name
                .as_deref()
                .map(ValueType::from_type_name)
                .unwrap_or(ValueType::String),
            location,
            required: location == ParameterLocation::Path || declared.required,
            description: declared.description.clone(),
        });
    }

    let undeclared_path = placeholders
        .into_iter()
        .map(|name| (name, ParameterLocation::Path))
        .chain(query_names.into_iter().map(|name| (name, ParameterLocation::Query)));
    for (name, location) in undeclared_path {
        if endpoint.parameters.iter().any(|p| p.name == name) {
            continue;
        }
        endpoint.parameters.push(EndpointParameter {
            name,
            value_type: ValueType::String,
            location,
            required: location == ParameterLocation::Path,
            description: String::new(),
        });
    }

    endpoint.responses = action
        .responses
        .iter()
        .map(|response| EndpointResponse {
            status_code: response.code.clone(),
            description: response.media_type.clone().unwrap_or_default(),
            schema: None,
        })
        .collect();
    endpoint
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::BlueprintParameter;

    fn action(method: &str, uri: &str) -> BlueprintAction {
        BlueprintAction {
            method: method.to_string(),
            uri_template: uri.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_split_uri_template() {
        let (path, query) = split_uri_template("/notes/{id}{?verbose,limit}{&page}");
        assert_eq!(path, "/notes/{id}");
        assert_eq!(query, vec!["verbose", "limit", "page"]);
    }

    #[test]
    fn test_declared_and_implied_parameters() {
        let mut get = action("GET", "/notes/{id}{?verbose}");
        get.name = "Retrieve a Note".to_string();
        get.group = Some("Notes".to_string());
        get.parameters = vec![BlueprintParameter {
            name: "id".to_string(),
            type_name: Some("number".to_string()),
            required: false,
            description: "Note id".to_string(),
            location: None,
        }];

        let document = BlueprintDocument {
            actions: vec![get],
            ..Default::default()
        };
        let mut diagnostics = Diagnostics::new();
        let endpoints = blueprint_endpoints(&document, &mut diagnostics);
        let endpoint = &endpoints[0];

        assert_eq!(endpoint.path, "/notes/{id}");
        assert_eq!(endpoint.summary, "Retrieve a Note");
        assert_eq!(endpoint.tags, vec!["Notes"]);
        assert_eq!(endpoint.parameters.len(), 2);
        assert_eq!(endpoint.parameters[0].value_type, ValueType::Number);
        assert!(endpoint.parameters[0].required, "path parameters are always required");
        assert_eq!(endpoint.parameters[1].name, "verbose");
        assert_eq!(endpoint.parameters[1].location, ParameterLocation::Query);
        assert!(!endpoint.parameters[1].required);
    }

    #[test]
    fn test_options_action_is_skipped() {
        let document = BlueprintDocument {
            actions: vec![action("OPTIONS", "/notes"), action("DELETE", "/notes/{id}")],
            ..Default::default()
        };
        let mut diagnostics = Diagnostics::new();
        let endpoints = blueprint_endpoints(&document, &mut diagnostics);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, HttpMethod::Delete);
        assert_eq!(diagnostics.len(), 1);
    }
}
