//! RAML resource tree to endpoints

use super::normalizer::path_placeholders;
use super::{Endpoint, EndpointParameter, EndpointResponse, HttpMethod, ParameterLocation, RequestBody, ValueType};
use crate::core::{Diagnostics, Stage};
use crate::definition::{RamlDocument, RamlParameter, RamlResource};

pub(super) fn raml_endpoints(document: &RamlDocument, diagnostics: &mut Diagnostics) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    for resource in &document.resources {
        walk(resource, "", &[], &mut endpoints, diagnostics);
    }
    endpoints
}

/// Nested resources concatenate their relative URIs and inherit URI parameters
fn walk(
    resource: &RamlResource,
    parent_path: &str,
    inherited: &[RamlParameter],
    endpoints: &mut Vec<Endpoint>,
    diagnostics: &mut Diagnostics,
) {
    let path = format!("{parent_path}{}", resource.relative_uri);

    let mut uri_parameters = inherited.to_vec();
    for parameter in &resource.uri_parameters {
        match uri_parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter.clone(),
            None => uri_parameters.push(parameter.clone()),
        }
    }

    for raml_method in &resource.methods {
        let Ok(method) = raml_method.method.parse::<HttpMethod>() else {
            diagnostics.info_at(
                Stage::Normalization,
                format!("{} {path}", raml_method.method.to_ascii_uppercase()),
                "method is not exposed over MCP, skipped",
            );
            continue;
        };

        let mut endpoint = Endpoint::new(method, path.clone());
        endpoint.summary = raml_method.display_name.clone().unwrap_or_default();
        endpoint.description = raml_method
            .description
            .clone()
            .or_else(|| resource.description.clone())
            .unwrap_or_default();
        if let Some(name) = &resource.display_name {
            endpoint.tags.push(name.clone());
        }

        for name in path_placeholders(&path) {
            let declared = uri_parameters.iter().find(|p| p.name == name);
            endpoint.parameters.push(EndpointParameter {
                name: name.clone(),
                value_type: declared
                    .and_then(|p| p.type_name.as_deref())
                    .map(ValueType::from_type_name)
                    .unwrap_or(ValueType::String),
                location: ParameterLocation::Path,
                required: declared.and_then(|p| p.required).unwrap_or(true),
                description: declared
                    .and_then(|p| p.description.clone())
                    .unwrap_or_default(),
            });
        }

        for parameter in &raml_method.query_parameters {
            endpoint.parameters.push(EndpointParameter {
                name: parameter.name.clone(),
                value_type: parameter
                    .type_name
                    .as_deref()
                    .map(ValueType::from_type_name)
                    .unwrap_or(ValueType::String),
                location: ParameterLocation::Query,
                required: parameter.required.unwrap_or(false),
                description: parameter.description.clone().unwrap_or_default(),
            });
        }

        endpoint.request_body = raml_method.body.as_ref().map(|schema| RequestBody {
            description: String::new(),
            required: false,
            schema: Some(schema.clone()),
        });
        endpoint.responses = raml_method
            .responses
            .iter()
            .map(|response| EndpointResponse {
                status_code: response.code.clone(),
                description: response.description.clone().unwrap_or_default(),
                schema: response.schema.clone(),
            })
            .collect();

        endpoints.push(endpoint);
    }

    for child in &resource.children {
        walk(child, &path, &uri_parameters, endpoints, diagnostics);
    }
}
