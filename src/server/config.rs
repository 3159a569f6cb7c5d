//! Server configuration: everything a generator needs to emit one project.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::core::{Diagnostics, Error, Result, Stage};
use crate::endpoints::{Endpoint, HttpMethod, IdAllocator, classify_method};
use crate::generation::Language;

/// Header carrying the API key when an API Key configuration names none
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
/// Query or cookie parameter carrying the API key when none is named
pub const DEFAULT_API_KEY_PARAM: &str = "api_key";

const DEFAULT_VERSION: &str = "1.0.0";

/// Where an API key is sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyLocation {
    #[default]
    Header,
    Query,
    Cookie,
}

/// Authentication required on the generated server's `/mcp` routes.
///
/// Serialized with a `type` tag: `None`, `API Key`, `Bearer Token`,
/// `Basic Auth`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Authentication {
    #[default]
    #[serde(rename = "None", alias = "none")]
    None,
    #[serde(rename = "API Key", alias = "ApiKey", alias = "api_key")]
    ApiKey {
        #[serde(default)]
        location: KeyLocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Expected key, written to `.env.example` only
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    #[serde(rename = "Bearer Token", alias = "BearerToken", alias = "bearer")]
    BearerToken {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    #[serde(rename = "Basic Auth", alias = "BasicAuth", alias = "basic")]
    BasicAuth {
        /// `user:password`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
}

impl Authentication {
    pub fn api_key(location: KeyLocation, name: Option<&str>) -> Self {
        Authentication::ApiKey {
            location,
            name: name.map(str::to_string),
            value: None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Authentication::None)
    }

    /// Short identifier used by templates
    pub fn kind(&self) -> &'static str {
        match self {
            Authentication::None => "none",
            Authentication::ApiKey { .. } => "api_key",
            Authentication::BearerToken { .. } => "bearer",
            Authentication::BasicAuth { .. } => "basic",
        }
    }

    /// Effective key name for API Key authentication, falling back to the
    /// documented default for the key's location
    pub fn key_name(&self) -> Option<String> {
        let Authentication::ApiKey { location, name, .. } = self else {
            return None;
        };
        let configured = name.as_deref().map(str::trim).filter(|n| !n.is_empty());
        Some(match (configured, location) {
            (Some(name), _) => name.to_string(),
            (None, KeyLocation::Header) => DEFAULT_API_KEY_HEADER.to_string(),
            (None, _) => DEFAULT_API_KEY_PARAM.to_string(),
        })
    }

    pub fn key_location(&self) -> Option<KeyLocation> {
        match self {
            Authentication::ApiKey { location, .. } => Some(*location),
            _ => None,
        }
    }

    /// Configured secret, if any
    pub fn secret(&self) -> Option<&str> {
        match self {
            Authentication::None => None,
            Authentication::ApiKey { value, .. }
            | Authentication::BearerToken { value }
            | Authentication::BasicAuth { value } => value.as_deref().filter(|v| !v.is_empty()),
        }
    }
}

/// Deployment target, carried into metadata only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hosting {
    pub provider: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Default for Hosting {
    fn default() -> Self {
        Self {
            provider: "self-hosted".to_string(),
            kind: "container".to_string(),
            region: None,
        }
    }
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Generation input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub language: Language,
    #[serde(default)]
    pub authentication: Authentication,
    #[serde(default)]
    pub hosting: Hosting,
    /// Base URL of the wrapped API, written to `.env.example`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_base_url: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    pub fn new(name: impl Into<String>, language: Language) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            version: default_version(),
            language,
            authentication: Authentication::None,
            hosting: Hosting::default(),
            upstream_base_url: None,
            endpoints: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = authentication;
        self
    }

    pub fn with_hosting(mut self, hosting: Hosting) -> Self {
        self.hosting = hosting;
        self
    }

    pub fn with_upstream_base_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_base_url = Some(url.into());
        self
    }

    pub fn with_endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Endpoints the user kept selected, in order
    pub fn selected_endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter().filter(|e| e.selected)
    }

    /// Structural checks on fields the generator cannot default
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidServerConfig("`name` must not be empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(Error::InvalidServerConfig("`version` must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parse a configuration document as produced by an editing front end.
    ///
    /// Endpoints are read one at a time: an entry without a usable `path` or
    /// `method` is skipped with a warning instead of rejecting the document.
    /// Missing endpoint ids and capability kinds are filled in.
    pub fn from_json(content: &str, diagnostics: &mut Diagnostics) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(content)?;
        Self::from_value(value, diagnostics)
    }

    pub fn from_value(value: JsonValue, diagnostics: &mut Diagnostics) -> Result<Self> {
        let JsonValue::Object(mut object) = value else {
            return Err(Error::InvalidServerConfig(
                "configuration must be an object".to_string(),
            ));
        };

        let language = match object.get("language") {
            Some(JsonValue::String(raw)) => Language::from_str(raw)?,
            Some(other) => return Err(Error::UnsupportedLanguage(other.to_string())),
            None => {
                return Err(Error::InvalidServerConfig("`language` is required".to_string()));
            }
        };
        object.insert("language".to_string(), JsonValue::String(language.to_string()));

        let raw_endpoints = match object.remove("endpoints") {
            Some(JsonValue::Array(items)) => items,
            Some(JsonValue::Null) | None => Vec::new(),
            Some(_) => {
                return Err(Error::InvalidServerConfig("`endpoints` must be a list".to_string()));
            }
        };

        let mut config: ServerConfig = serde_json::from_value(JsonValue::Object(object))
            .map_err(|e| Error::InvalidServerConfig(e.to_string()))?;
        config.endpoints = read_endpoints(raw_endpoints, diagnostics);
        config.validate()?;
        Ok(config)
    }
}

/// Incremental construction of a [`ServerConfig`]; `build` validates
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    language: Option<Language>,
    authentication: Authentication,
    hosting: Option<Hosting>,
    upstream_base_url: Option<String>,
    endpoints: Vec<Endpoint>,
}

impl ServerConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = authentication;
        self
    }

    pub fn hosting(mut self, hosting: Hosting) -> Self {
        self.hosting = Some(hosting);
        self
    }

    pub fn upstream_base_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_base_url = Some(url.into());
        self
    }

    pub fn endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn build(self) -> Result<ServerConfig> {
        let name = self
            .name
            .ok_or_else(|| Error::InvalidServerConfig("`name` is required".to_string()))?;
        let language = self
            .language
            .ok_or_else(|| Error::InvalidServerConfig("`language` is required".to_string()))?;
        let config = ServerConfig {
            name,
            description: self.description.unwrap_or_default(),
            version: self.version.unwrap_or_else(default_version),
            language,
            authentication: self.authentication,
            hosting: self.hosting.unwrap_or_default(),
            upstream_base_url: self.upstream_base_url,
            endpoints: self.endpoints,
        };
        config.validate()?;
        Ok(config)
    }
}

fn read_endpoints(items: Vec<JsonValue>, diagnostics: &mut Diagnostics) -> Vec<Endpoint> {
    let mut ids = IdAllocator::new();
    let mut endpoints = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let subject = format!("endpoints[{index}]");
        let JsonValue::Object(mut object) = item else {
            diagnostics.warn_at(Stage::Configuration, subject, "endpoint is not an object, skipped");
            continue;
        };

        let path = object
            .get("path")
            .and_then(JsonValue::as_str)
            .map(str::trim)
            .filter(|p| !p.is_empty());
        let method = object
            .get("method")
            .and_then(JsonValue::as_str)
            .and_then(|m| m.parse::<HttpMethod>().ok());
        let (Some(_), Some(method)) = (path, method) else {
            diagnostics.warn_at(Stage::Configuration, subject, "endpoint is missing a path or method, skipped");
            continue;
        };

        if !object.contains_key("mcpType") {
            object.insert(
                "mcpType".to_string(),
                serde_json::to_value(classify_method(method)).unwrap_or(JsonValue::Null),
            );
        }

        let mut endpoint: Endpoint = match serde_json::from_value(JsonValue::Object(object)) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                diagnostics.warn_at(Stage::Configuration, subject, format!("invalid endpoint, skipped: {e}"));
                continue;
            }
        };

        if endpoint.id.is_empty() || !ids.reserve(&endpoint.id) {
            if !endpoint.id.is_empty() {
                diagnostics.warn_at(
                    Stage::Configuration,
                    endpoint.label(),
                    format!("duplicate endpoint id `{}` replaced", endpoint.id),
                );
            }
            endpoint.id = ids.allocate(endpoint.method, &endpoint.path);
        }
        endpoints.push(endpoint);
    }
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::McpType;
    use serde_json::json;

    #[test]
    fn test_api_key_without_name_uses_default_header() {
        let auth: Authentication = serde_json::from_value(json!({"type": "API Key"})).unwrap();
        assert_eq!(auth.key_location(), Some(KeyLocation::Header));
        assert_eq!(auth.key_name().as_deref(), Some("X-API-Key"));

        let query = Authentication::api_key(KeyLocation::Query, Some("  "));
        assert_eq!(query.key_name().as_deref(), Some("api_key"));
    }

    #[test]
    fn test_authentication_tags() {
        let bearer: Authentication =
            serde_json::from_value(json!({"type": "Bearer Token", "value": "t0k"})).unwrap();
        assert_eq!(bearer.kind(), "bearer");
        assert_eq!(bearer.secret(), Some("t0k"));

        // Fields meaningless for None are ignored
        let none: Authentication =
            serde_json::from_value(json!({"type": "None", "location": "header", "name": "X"})).unwrap();
        assert!(none.is_none());
        assert_eq!(none.key_name(), None);

        assert_eq!(
            serde_json::to_value(Authentication::BasicAuth { value: None }).unwrap(),
            json!({"type": "Basic Auth"})
        );
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let mut diagnostics = Diagnostics::new();
        let config = ServerConfig::from_json(
            r#"{
                "name": "Pets",
                "language": "TS",
                "authentication": {"type": "API Key"},
                "endpoints": [
                    {"path": "/pets", "method": "GET"},
                    {"path": "/pets", "method": "post", "mcpType": "none", "selected": false}
                ]
            }"#,
            &mut diagnostics,
        )
        .unwrap();

        assert!(diagnostics.is_empty());
        assert_eq!(config.language, Language::TypeScript);
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.hosting, Hosting::default());
        assert_eq!(config.endpoints[0].mcp_type, McpType::Resource);
        assert!(!config.endpoints[0].id.is_empty());
        assert_eq!(config.endpoints[1].mcp_type, McpType::None);
        assert_eq!(config.selected_endpoints().count(), 1);
    }

    #[test]
    fn test_from_json_skips_malformed_endpoints() {
        let mut diagnostics = Diagnostics::new();
        let config = ServerConfig::from_json(
            r#"{
                "name": "Pets",
                "language": "go",
                "endpoints": [
                    {"method": "GET"},
                    {"path": "/pets"},
                    {"path": "/pets", "method": "FETCH"},
                    "nonsense",
                    {"path": "/pets/{id}", "method": "DELETE"}
                ]
            }"#,
            &mut diagnostics,
        )
        .unwrap();

        assert_eq!(config.endpoints.len(), 1);
        assert_eq!(config.endpoints[0].mcp_type, McpType::Tool);
        assert_eq!(diagnostics.warnings().count(), 4);
    }

    #[test]
    fn test_from_json_rejects_unknown_language() {
        let mut diagnostics = Diagnostics::new();
        let err = ServerConfig::from_json(r#"{"name": "x", "language": "cobol"}"#, &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(ref l) if l == "cobol"));
    }

    #[test]
    fn test_from_json_requires_name() {
        let mut diagnostics = Diagnostics::new();
        let err = ServerConfig::from_json(r#"{"name": " ", "language": "python"}"#, &mut diagnostics)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidServerConfig(_)));
    }

    #[test]
    fn test_builder_requires_language() {
        let err = ServerConfig::builder().name("pets").build().unwrap_err();
        assert!(matches!(err, Error::InvalidServerConfig(_)));

        let config = ServerConfig::builder()
            .name("pets")
            .language(Language::Python)
            .authentication(Authentication::BearerToken { value: None })
            .build()
            .unwrap();
        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.authentication.kind(), "bearer");
    }

    #[test]
    fn test_duplicate_ids_are_replaced() {
        let mut diagnostics = Diagnostics::new();
        let config = ServerConfig::from_json(
            r#"{
                "name": "Pets",
                "language": "rust",
                "endpoints": [
                    {"id": "same", "path": "/a", "method": "GET"},
                    {"id": "same", "path": "/b", "method": "GET"}
                ]
            }"#,
            &mut diagnostics,
        )
        .unwrap();
        assert_eq!(config.endpoints[0].id, "same");
        assert_ne!(config.endpoints[1].id, "same");
        assert!(diagnostics.has_warnings());
    }
}
