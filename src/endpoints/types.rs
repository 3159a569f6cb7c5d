//! Canonical endpoint model shared by every source format

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// HTTP methods an endpoint can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "head")]
    Head,
}

impl HttpMethod {
    /// Methods in the order operations are read from a path item
    pub fn all() -> &'static [HttpMethod] {
        &[
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
            HttpMethod::Head,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Lower-case key used by OpenAPI path items and RAML resources
    pub fn key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
            HttpMethod::Head => "head",
        }
    }

    /// Whether requests with this method usually carry a body
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(format!("unsupported HTTP method: {other}")),
        }
    }
}

/// MCP capability kind of an endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum McpType {
    /// Not exposed
    #[default]
    None,
    Resource,
    Tool,
}

impl fmt::Display for McpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            McpType::None => "none",
            McpType::Resource => "resource",
            McpType::Tool => "tool",
        };
        f.write_str(name)
    }
}

/// Value type of a parameter, mapped to a concrete type by each generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ValueType {
    String,
    Integer,
    Number,
    Boolean,
    Array { items: Box<ValueType> },
    Object,
    /// Schema text that could not be mapped, kept verbatim
    Opaque { raw: String },
}

impl ValueType {
    pub fn opaque(raw: impl Into<String>) -> Self {
        ValueType::Opaque { raw: raw.into() }
    }

    /// Map a type name as written in RAML or API Blueprint
    pub fn from_type_name(name: &str) -> Self {
        let name = name.trim();
        if let Some(inner) = name.strip_suffix("[]") {
            return ValueType::Array {
                items: Box::new(ValueType::from_type_name(inner)),
            };
        }
        if let Some(inner) = name
            .strip_prefix("array[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return ValueType::Array {
                items: Box::new(ValueType::from_type_name(inner)),
            };
        }
        match name.to_ascii_lowercase().as_str() {
            "string" => ValueType::String,
            "integer" | "int" => ValueType::Integer,
            "number" | "float" | "double" => ValueType::Number,
            "boolean" | "bool" => ValueType::Boolean,
            "array" => ValueType::Array {
                items: Box::new(ValueType::opaque("")),
            },
            "object" => ValueType::Object,
            _ => ValueType::opaque(name),
        }
    }

    /// Map a JSON Schema fragment (OpenAPI `schema` or Swagger 2 parameter)
    pub fn from_schema(schema: &JsonValue) -> Self {
        let Some(object) = schema.as_object() else {
            return match schema.as_str() {
                Some(name) => ValueType::from_type_name(name),
                None => ValueType::opaque(schema.to_string()),
            };
        };

        if let Some(reference) = object.get("$ref").and_then(JsonValue::as_str) {
            return ValueType::opaque(reference);
        }

        let type_name = match object.get("type") {
            Some(JsonValue::String(name)) => Some(name.as_str()),
            // OpenAPI 3.1 type lists: first non-null entry
            Some(JsonValue::Array(names)) => names
                .iter()
                .filter_map(JsonValue::as_str)
                .find(|name| *name != "null"),
            _ => None,
        };

        match type_name {
            Some("array") => ValueType::Array {
                items: Box::new(
                    object
                        .get("items")
                        .map(ValueType::from_schema)
                        .unwrap_or_else(|| ValueType::opaque("")),
                ),
            },
            Some("string") => ValueType::String,
            Some("integer") => ValueType::Integer,
            Some("number") => ValueType::Number,
            Some("boolean") => ValueType::Boolean,
            Some("object") => ValueType::Object,
            Some(other) => ValueType::opaque(other),
            None if object.contains_key("properties") => ValueType::Object,
            None => ValueType::opaque(schema.to_string()),
        }
    }
}

/// Where a parameter travels in the upstream request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    /// Form field (Swagger 2 `formData`)
    Form,
}

impl FromStr for ParameterLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "path" => Ok(ParameterLocation::Path),
            "query" => Ok(ParameterLocation::Query),
            "header" => Ok(ParameterLocation::Header),
            "cookie" => Ok(ParameterLocation::Cookie),
            "formdata" | "form" => Ok(ParameterLocation::Form),
            other => Err(format!("unsupported parameter location: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

impl EndpointParameter {
    /// Path parameters are always required; others default to optional
    pub fn new(name: impl Into<String>, location: ParameterLocation, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            location,
            required: location == ParameterLocation::Path,
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResponse {
    pub status_code: String,
    #[serde(default)]
    pub description: String,
    /// Response schema as written; `None` means unknown
    #[serde(default)]
    pub schema: Option<JsonValue>,
}

impl EndpointResponse {
    pub fn is_success(&self) -> bool {
        self.status_code.starts_with('2') || self.status_code.eq_ignore_ascii_case("default")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub schema: Option<JsonValue>,
}

fn default_selected() -> bool {
    true
}

/// Canonical, format-independent API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(default)]
    pub id: String,
    pub path: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<EndpointParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: Vec<EndpointResponse>,
    #[serde(default)]
    pub mcp_type: McpType,
    #[serde(default = "default_selected")]
    pub selected: bool,
}

impl Endpoint {
    /// A bare endpoint; the normalizer fills in id and classification
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            path: path.into(),
            method,
            operation_id: None,
            summary: String::new(),
            description: String::new(),
            tags: Vec::new(),
            parameters: Vec::new(),
            request_body: None,
            responses: Vec::new(),
            mcp_type: McpType::None,
            selected: true,
        }
    }

    /// `GET /pets/{id}` style label used in diagnostics
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path)
    }

    pub fn parameters_in(&self, location: ParameterLocation) -> impl Iterator<Item = &EndpointParameter> {
        self.parameters.iter().filter(move |p| p.location == location)
    }

    /// First success response, if any
    pub fn success_response(&self) -> Option<&EndpointResponse> {
        self.responses
            .iter()
            .find(|r| r.status_code.starts_with('2'))
            .or_else(|| self.responses.iter().find(|r| r.is_success()))
    }
}
