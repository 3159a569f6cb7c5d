//! OpenAPI 2 (Swagger) and OpenAPI 3 endpoint extraction.
//!
//! The document is walked as a raw object graph rather than deserialized into
//! a typed model, so that half-broken definitions still yield whatever
//! operations are readable. Problems are reported as diagnostics.

use serde_json::{Map, Value as JsonValue};

use super::{
    Endpoint, EndpointParameter, EndpointResponse, HttpMethod, ParameterLocation, RequestBody,
    ValueType,
};
use crate::core::{Diagnostics, Stage};

/// Upper bound on chained `$ref` hops inside one schema
const MAX_REF_DEPTH: usize = 32;

pub(super) struct OpenApiNormalizer<'a> {
    root: &'a JsonValue,
}

impl<'a> OpenApiNormalizer<'a> {
    pub(super) fn new(root: &'a JsonValue) -> Self {
        Self { root }
    }

    pub(super) fn endpoints(&self, diagnostics: &mut Diagnostics) -> Vec<Endpoint> {
        if self.root.get("openapi").is_none() && self.root.get("swagger").is_none() {
            diagnostics.warn(
                Stage::Normalization,
                "document declares neither `openapi` nor `swagger`; reading `paths` anyway",
            );
        }

        let Some(paths) = self.root.get("paths") else {
            diagnostics.warn(Stage::Normalization, "document has no `paths` object");
            return Vec::new();
        };
        let Some(paths) = paths.as_object() else {
            diagnostics.warn(Stage::Normalization, "`paths` is not an object");
            return Vec::new();
        };

        let mut endpoints = Vec::new();
        for (path, item) in paths {
            if path.starts_with("x-") {
                continue;
            }
            let subject = format!("paths.{path}");
            let Some(item) = self.follow(item, &subject, diagnostics).and_then(JsonValue::as_object)
            else {
                diagnostics.warn_at(Stage::Normalization, subject, "path item is not an object, skipped");
                continue;
            };

            for unsupported in ["options", "trace"] {
                if item.contains_key(unsupported) {
                    diagnostics.info_at(
                        Stage::Normalization,
                        format!("{} {path}", unsupported.to_ascii_uppercase()),
                        "method is not exposed over MCP, skipped",
                    );
                }
            }

            let shared = self.parameters(item.get("parameters"), &subject, diagnostics);
            for method in HttpMethod::all() {
                let Some(operation) = item.get(method.key()) else {
                    continue;
                };
                let label = format!("{method} {path}");
                let Some(operation) = operation.as_object() else {
                    diagnostics.warn_at(Stage::Normalization, label, "operation is not an object, skipped");
                    continue;
                };
                endpoints.push(self.endpoint(path, *method, item, &shared, operation, diagnostics));
            }
        }
        endpoints
    }

    fn endpoint(
        &self,
        path: &str,
        method: HttpMethod,
        path_item: &'a Map<String, JsonValue>,
        shared: &ParameterSet,
        operation: &'a Map<String, JsonValue>,
        diagnostics: &mut Diagnostics,
    ) -> Endpoint {
        let label = format!("{method} {path}");
        let text = |key: &str| {
            operation
                .get(key)
                .or_else(|| path_item.get(key))
                .and_then(JsonValue::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let mut endpoint = Endpoint::new(method, path);
        endpoint.operation_id = operation
            .get("operationId")
            .and_then(JsonValue::as_str)
            .map(String::from);
        endpoint.summary = text("summary");
        endpoint.description = text("description");
        endpoint.tags = operation
            .get("tags")
            .and_then(JsonValue::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(JsonValue::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        // Operation-level parameters replace path-level ones with the same name
        let own = self.parameters(operation.get("parameters"), &label, diagnostics);
        let mut parameters = shared.parameters.clone();
        for parameter in own.parameters {
            match parameters.iter_mut().find(|p| p.name == parameter.name) {
                Some(existing) => *existing = parameter,
                None => parameters.push(parameter),
            }
        }
        endpoint.parameters = parameters;

        endpoint.request_body = match operation.get("requestBody") {
            Some(body) => self.request_body(body, &label, diagnostics),
            None => own.body.or_else(|| shared.body.clone()),
        };
        endpoint.responses = self.responses(operation.get("responses"), &label, diagnostics);
        endpoint
    }

    fn parameters(
        &self,
        node: Option<&'a JsonValue>,
        subject: &str,
        diagnostics: &mut Diagnostics,
    ) -> ParameterSet {
        let mut set = ParameterSet::default();
        let Some(node) = node else {
            return set;
        };
        let Some(items) = node.as_array() else {
            diagnostics.warn_at(Stage::Normalization, subject, "`parameters` is not a list");
            return set;
        };

        for item in items {
            let Some(parameter) = self.follow(item, subject, diagnostics).and_then(JsonValue::as_object)
            else {
                diagnostics.warn_at(Stage::Normalization, subject, "parameter is not an object, skipped");
                continue;
            };
            let Some(name) = parameter.get("name").and_then(JsonValue::as_str) else {
                diagnostics.warn_at(Stage::Normalization, subject, "parameter without a name, skipped");
                continue;
            };
            let location = parameter.get("in").and_then(JsonValue::as_str).unwrap_or("");
            let description = parameter
                .get("description")
                .and_then(JsonValue::as_str)
                .unwrap_or("")
                .trim()
                .to_string();
            let declared_required = parameter.get("required").and_then(JsonValue::as_bool);

            // Swagger 2 body parameter
            if location == "body" {
                set.body = Some(RequestBody {
                    description,
                    required: declared_required.unwrap_or(false),
                    schema: parameter
                        .get("schema")
                        .map(|schema| self.resolve_schema(schema, subject, diagnostics)),
                });
                continue;
            }

            let Ok(location) = location.parse::<ParameterLocation>() else {
                diagnostics.warn_at(
                    Stage::Normalization,
                    subject,
                    format!("parameter `{name}` has unsupported location `{location}`, skipped"),
                );
                continue;
            };

            let value_type = if let Some(schema) = parameter.get("schema") {
                ValueType::from_schema(&self.resolve_schema(schema, subject, diagnostics))
            } else if parameter.contains_key("type") {
                ValueType::from_schema(&JsonValue::Object(parameter.clone()))
            } else if let Some(schema) = parameter.get("content").and_then(content_schema) {
                ValueType::from_schema(&self.resolve_schema(schema, subject, diagnostics))
            } else {
                ValueType::opaque("")
            };

            set.parameters.push(EndpointParameter {
                name: name.to_string(),
                value_type,
                location,
                required: declared_required.unwrap_or(location == ParameterLocation::Path),
                description,
            });
        }
        set
    }

    fn request_body(
        &self,
        node: &'a JsonValue,
        subject: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<RequestBody> {
        let Some(body) = self.follow(node, subject, diagnostics).and_then(JsonValue::as_object) else {
            diagnostics.warn_at(Stage::Normalization, subject, "`requestBody` is not an object, ignored");
            return None;
        };
        Some(RequestBody {
            description: body
                .get("description")
                .and_then(JsonValue::as_str)
                .unwrap_or("")
                .trim()
                .to_string(),
            required: body.get("required").and_then(JsonValue::as_bool).unwrap_or(false),
            schema: body
                .get("content")
                .and_then(content_schema)
                .map(|schema| self.resolve_schema(schema, subject, diagnostics)),
        })
    }

    fn responses(
        &self,
        node: Option<&'a JsonValue>,
        subject: &str,
        diagnostics: &mut Diagnostics,
    ) -> Vec<EndpointResponse> {
        let Some(responses) = node.and_then(JsonValue::as_object) else {
            return Vec::new();
        };

        responses
            .iter()
            .filter(|(code, _)| !code.starts_with("x-"))
            .map(|(code, response)| {
                let response = self.follow(response, subject, diagnostics);
                let description = response
                    .and_then(|r| r.get("description"))
                    .and_then(JsonValue::as_str)
                    .unwrap_or("")
                    .trim()
                    .to_string();
                // Swagger 2 `schema`, OpenAPI 3 `content.<media type>.schema`
                let schema = response
                    .and_then(|r| r.get("schema").or_else(|| r.get("content").and_then(content_schema)))
                    .map(|schema| self.resolve_schema(schema, subject, diagnostics));
                EndpointResponse {
                    status_code: code.clone(),
                    description,
                    schema,
                }
            })
            .collect()
    }

    /// Follow `$ref` links of a non-schema object (path item, parameter,
    /// response, request body) until a concrete value is reached
    fn follow(
        &self,
        value: &'a JsonValue,
        subject: &str,
        diagnostics: &mut Diagnostics,
    ) -> Option<&'a JsonValue> {
        let mut current = value;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(JsonValue::as_str) else {
                return Some(current);
            };
            match self.lookup(reference) {
                Some(target) => current = target,
                None => {
                    diagnostics.warn_at(
                        Stage::Normalization,
                        subject,
                        format!("unresolvable reference `{reference}`"),
                    );
                    return None;
                }
            }
        }
        diagnostics.warn_at(Stage::Normalization, subject, "reference chain too deep");
        None
    }

    /// Inline internal `$ref`s of a schema. Cycles and unresolvable references
    /// are left as `$ref` objects, which downstream treat as opaque types.
    fn resolve_schema(&self, schema: &JsonValue, subject: &str, diagnostics: &mut Diagnostics) -> JsonValue {
        let mut chain = Vec::new();
        self.resolve_in_chain(schema, &mut chain, subject, diagnostics)
    }

    fn resolve_in_chain(
        &self,
        value: &JsonValue,
        chain: &mut Vec<String>,
        subject: &str,
        diagnostics: &mut Diagnostics,
    ) -> JsonValue {
        match value {
            JsonValue::Object(object) => {
                if let Some(reference) = object.get("$ref").and_then(JsonValue::as_str) {
                    if chain.len() >= MAX_REF_DEPTH || chain.iter().any(|r| r == reference) {
                        return value.clone();
                    }
                    let Some(target) = self.lookup(reference) else {
                        diagnostics.warn_at(
                            Stage::Normalization,
                            subject,
                            format!("unresolvable reference `{reference}` kept as opaque schema"),
                        );
                        return value.clone();
                    };
                    chain.push(reference.to_string());
                    let resolved = self.resolve_in_chain(target, chain, subject, diagnostics);
                    chain.pop();
                    return resolved;
                }

                JsonValue::Object(
                    object
                        .iter()
                        .map(|(key, value)| {
                            (key.clone(), self.resolve_in_chain(value, chain, subject, diagnostics))
                        })
                        .collect(),
                )
            }
            JsonValue::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|item| self.resolve_in_chain(item, chain, subject, diagnostics))
                    .collect(),
            ),
            _ => value.clone(),
        }
    }

    /// Resolve an internal reference like `#/components/schemas/Pet`
    fn lookup(&self, reference: &str) -> Option<&'a JsonValue> {
        reference
            .strip_prefix('#')
            .and_then(|pointer| self.root.pointer(pointer))
    }
}

#[derive(Debug, Default)]
struct ParameterSet {
    parameters: Vec<EndpointParameter>,
    /// Swagger 2 `in: body` parameter
    body: Option<RequestBody>,
}

/// Schema of a `content` map, preferring JSON media types
fn content_schema(content: &JsonValue) -> Option<&JsonValue> {
    let content = content.as_object()?;
    content
        .get("application/json")
        .or_else(|| {
            content
                .iter()
                .find(|(media_type, _)| media_type.contains("json"))
                .map(|(_, value)| value)
        })
        .or_else(|| content.values().next())
        .and_then(|media| media.get("schema"))
}
