//! Language-independent intermediate representation of a generated server.
//!
//! [`ServerIr::build`] turns a [`ServerConfig`] into the route table every
//! backend renders: which endpoints become routes, under which handler names,
//! with which typed parameters. Building it once keeps the capability
//! listings identical across target languages.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::core::{Diagnostics, Stage};
use crate::endpoints::{Endpoint, HttpMethod, McpType, ParameterLocation, ValueType, operation_name};
use crate::generation::GenerationError;
use crate::generation::rules::{package_name, validate_package_name};
use crate::generation::sanitizers::{doc_line, summary_line};
use crate::server::{Authentication, Hosting, KeyLocation, ServerConfig};

/// Summaries derived from a description are cut to this many characters
const SUMMARY_MAX: usize = 120;

pub const RESOURCE_PREFIX: &str = "/mcp/resources";
pub const TOOL_PREFIX: &str = "/mcp/tools";

/// Capability kind of a generated route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Resource,
    Tool,
}

impl RouteKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            RouteKind::Resource => RESOURCE_PREFIX,
            RouteKind::Tool => TOOL_PREFIX,
        }
    }

    /// Method the generated server accepts on this route
    pub fn http_method(&self) -> HttpMethod {
        match self {
            RouteKind::Resource => HttpMethod::Get,
            RouteKind::Tool => HttpMethod::Post,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Resource => "resource",
            RouteKind::Tool => "tool",
        }
    }
}

/// One `/`-separated piece of an endpoint path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PathSegment {
    Literal(String),
    /// `{name}` spanning the whole segment
    Param(String),
    /// Placeholders embedded in text, e.g. `{name}.json`
    Mixed(SegmentPattern),
}

impl PathSegment {
    fn literal(&self) -> Option<&str> {
        match self {
            PathSegment::Literal(text) => Some(text),
            _ => None,
        }
    }
}

/// A segment mixing literal text with placeholders. Routers mount it as one
/// whole-segment wildcard; the handler splits the captured value on `texts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentPattern {
    /// Placeholder name the segment is mounted under
    pub wildcard: String,
    /// Text before, between and after the placeholders; one more than `params`
    pub texts: Vec<String>,
    pub params: Vec<String>,
}

impl SegmentPattern {
    /// Segment as written in the definition
    pub fn template(&self) -> String {
        let mut out = self.texts[0].clone();
        for (name, text) in self.params.iter().zip(&self.texts[1..]) {
            out.push_str(&["{", name, "}"].concat());
            out.push_str(text);
        }
        out
    }
}

/// Declared parameter of a route, as the handler reads it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteParam {
    /// Name in the API definition
    pub name: String,
    pub value_type: ValueType,
    pub required: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub endpoint_id: String,
    /// Unique snake_case handler name
    pub handler: String,
    pub kind: RouteKind,
    /// Method used when forwarding upstream
    pub method: HttpMethod,
    /// Path as declared in the API definition
    pub path: String,
    pub segments: Vec<PathSegment>,
    pub trailing_slash: bool,
    pub path_params: Vec<RouteParam>,
    pub query_params: Vec<RouteParam>,
    pub summary: String,
    pub description: String,
}

impl Route {
    /// Route path on the generated server, with placeholders rendered by
    /// `param` (e.g. `:id` or `{id}`)
    pub fn mount_path(&self, param: impl Fn(&str) -> String) -> String {
        self.join(|segment| match segment {
            PathSegment::Literal(text) => text.clone(),
            PathSegment::Param(name) => param(name),
            PathSegment::Mixed(pattern) => param(&pattern.wildcard),
        })
    }

    /// Route path as clients see it, e.g. `/mcp/resources/files/{name}.json`
    pub fn public_path(&self) -> String {
        self.join(|segment| match segment {
            PathSegment::Literal(text) => text.clone(),
            PathSegment::Param(name) => ["{", name, "}"].concat(),
            PathSegment::Mixed(pattern) => pattern.template(),
        })
    }

    fn join(&self, render: impl Fn(&PathSegment) -> String) -> String {
        let mut out = String::from(self.kind.prefix());
        for segment in &self.segments {
            out.push('/');
            out.push_str(&render(segment));
        }
        if self.trailing_slash || self.segments.is_empty() {
            out.push('/');
        }
        out
    }

    /// Kind and path with placeholder names erased; two routes with the same
    /// shape would collide in every router
    fn shape(&self) -> (RouteKind, String) {
        (self.kind, self.mount_path(|_| "{}".to_string()))
    }

    /// Whether both routes match some common request while neither matches a
    /// subset of the other's requests. net/http refuses to register such a
    /// pair, e.g. `/users/{id}/profile` and `/users/me/{field}`.
    fn overlaps_ambiguously(&self, other: &Route) -> bool {
        if self.kind != other.kind
            || self.trailing_slash != other.trailing_slash
            || self.segments.len() != other.segments.len()
        {
            return false;
        }
        let (mut narrower, mut wider) = (false, false);
        for (ours, theirs) in self.segments.iter().zip(&other.segments) {
            match (ours.literal(), theirs.literal()) {
                (Some(a), Some(b)) if a != b => return false,
                (Some(_), None) => narrower = true,
                (None, Some(_)) => wider = true,
                _ => {}
            }
        }
        narrower && wider
    }
}

/// Authentication scheme the generated middleware enforces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthScheme {
    /// `none`, `api_key`, `bearer` or `basic`
    pub kind: &'static str,
    pub location: Option<KeyLocation>,
    pub key_name: Option<String>,
    /// Environment variable holding the expected secret
    pub env_var: Option<&'static str>,
}

impl AuthScheme {
    fn from_config(authentication: &Authentication) -> Self {
        let env_var = match authentication {
            Authentication::None => None,
            Authentication::ApiKey { .. } => Some("MCP_API_KEY"),
            Authentication::BearerToken { .. } => Some("MCP_BEARER_TOKEN"),
            Authentication::BasicAuth { .. } => Some("MCP_BASIC_AUTH"),
        };
        Self {
            kind: authentication.kind(),
            location: authentication.key_location(),
            key_name: authentication.key_name(),
            env_var,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.kind != "none"
    }
}

/// Everything a backend needs to render one project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerIr {
    pub name: String,
    pub package_name: String,
    pub description: String,
    pub version: String,
    pub auth: AuthScheme,
    pub routes: Vec<Route>,
    pub hosting: Hosting,
    pub upstream_base_url: Option<String>,
}

impl ServerIr {
    pub fn build(config: &ServerConfig, diagnostics: &mut Diagnostics) -> Result<Self, GenerationError> {
        if config.name.trim().is_empty() {
            return Err(GenerationError::ValidationError(
                "server name cannot be empty".to_string(),
            ));
        }
        let package_name = package_name(&config.name);
        validate_package_name(&package_name)?;

        let mut routes: Vec<Route> = Vec::new();
        let mut handlers = HashSet::new();
        let mut shapes = HashSet::new();

        for endpoint in &config.endpoints {
            if !endpoint.selected {
                debug!(endpoint = %endpoint.label(), "Skipping unselected endpoint");
                continue;
            }
            let kind = match endpoint.mcp_type {
                McpType::Resource => RouteKind::Resource,
                McpType::Tool => RouteKind::Tool,
                McpType::None => {
                    diagnostics.info_at(
                        Stage::Generation,
                        endpoint.label(),
                        "capability type is none, no route generated",
                    );
                    continue;
                }
            };

            let Some(mut route) = route_for(endpoint, kind, diagnostics) else {
                continue;
            };

            if let Some(earlier) = routes.iter().find(|r| r.overlaps_ambiguously(&route)) {
                diagnostics.warn_at(
                    Stage::Generation,
                    endpoint.label(),
                    format!(
                        "route {} overlaps {} and neither is more specific, skipped",
                        route.public_path(),
                        earlier.public_path()
                    ),
                );
                continue;
            }
            if !shapes.insert(route.shape()) {
                diagnostics.warn_at(
                    Stage::Generation,
                    endpoint.label(),
                    format!("route {} duplicates an earlier route, skipped", route.public_path()),
                );
                continue;
            }

            route.handler = unique_handler(&route.handler, &mut handlers);
            routes.push(route);
        }

        if routes.is_empty() {
            diagnostics.warn(Stage::Generation, "no routes generated; the server only answers `GET /`");
        }
        debug!(routes = routes.len(), "Built server IR");

        Ok(Self {
            name: config.name.trim().to_string(),
            package_name,
            description: doc_line(&config.description),
            version: config.version.clone(),
            auth: AuthScheme::from_config(&config.authentication),
            routes,
            hosting: config.hosting.clone(),
            upstream_base_url: config.upstream_base_url.clone(),
        })
    }

    pub fn routes_of(&self, kind: RouteKind) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(move |r| r.kind == kind)
    }

    /// Original paths listed under `capabilities` by `GET /`
    pub fn capability_paths(&self, kind: RouteKind) -> Vec<&str> {
        self.routes_of(kind).map(|r| r.path.as_str()).collect()
    }
}

fn route_for(endpoint: &Endpoint, kind: RouteKind, diagnostics: &mut Diagnostics) -> Option<Route> {
    let path = endpoint.path.trim();
    if path.is_empty() || !path.starts_with('/') {
        diagnostics.warn_at(
            Stage::Generation,
            endpoint.label(),
            "path must be non-empty and start with `/`, endpoint skipped",
        );
        return None;
    }

    let segments = match split_path(path) {
        Ok(segments) => segments,
        Err(segment) => {
            diagnostics.warn_at(
                Stage::Generation,
                endpoint.label(),
                format!("path segment `{segment}` is not a valid placeholder pattern, endpoint skipped"),
            );
            return None;
        }
    };

    let path_params = segments
        .iter()
        .flat_map(|segment| -> &[String] {
            match segment {
                PathSegment::Param(name) => std::slice::from_ref(name),
                PathSegment::Mixed(pattern) => &pattern.params,
                PathSegment::Literal(_) => &[],
            }
        })
        .map(|name| {
            let declared = endpoint
                .parameters_in(ParameterLocation::Path)
                .find(|p| &p.name == name);
            RouteParam {
                name: name.clone(),
                value_type: declared.map(|p| p.value_type.clone()).unwrap_or(ValueType::String),
                required: true,
                description: declared.map(|p| doc_line(&p.description)).unwrap_or_default(),
            }
        })
        .collect();

    let query_params = endpoint
        .parameters_in(ParameterLocation::Query)
        .map(|p| RouteParam {
            name: p.name.clone(),
            value_type: p.value_type.clone(),
            required: p.required,
            description: doc_line(&p.description),
        })
        .collect();

    Some(Route {
        endpoint_id: endpoint.id.clone(),
        handler: operation_name(endpoint),
        kind,
        method: endpoint.method,
        path: path.to_string(),
        trailing_slash: path.len() > 1 && path.ends_with('/'),
        segments,
        path_params,
        query_params,
        summary: if endpoint.summary.trim().is_empty() {
            summary_line(&endpoint.description, SUMMARY_MAX)
        } else {
            doc_line(&endpoint.summary)
        },
        description: doc_line(&endpoint.description),
    })
}

/// Split a path into segments; `Err` carries a segment with unbalanced or
/// empty braces, adjacent placeholders or a repeated placeholder name
fn split_path(path: &str) -> Result<Vec<PathSegment>, String> {
    let mut seen = HashSet::new();
    let mut segments = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        let (texts, params) = parse_segment(segment).ok_or_else(|| segment.to_string())?;
        if !params.iter().all(|name| seen.insert(name.clone())) {
            return Err(segment.to_string());
        }
        segments.push(match params.len() {
            0 => PathSegment::Literal(segment.to_string()),
            1 if texts.iter().all(String::is_empty) => PathSegment::Param(params[0].clone()),
            _ => PathSegment::Mixed(SegmentPattern {
                wildcard: String::new(),
                texts,
                params,
            }),
        });
    }

    // wildcard names must not shadow any placeholder of the path
    let mut n = 0;
    for segment in &mut segments {
        if let PathSegment::Mixed(pattern) = segment {
            n += 1;
            let mut wildcard = format!("segment_{n}");
            while seen.contains(&wildcard) {
                wildcard.push('_');
            }
            seen.insert(wildcard.clone());
            pattern.wildcard = wildcard;
        }
    }
    Ok(segments)
}

/// Literal texts and placeholder names of one segment; `None` on unbalanced
/// or empty braces and on placeholders with no text between them
fn parse_segment(segment: &str) -> Option<(Vec<String>, Vec<String>)> {
    let mut texts = Vec::new();
    let mut params = Vec::new();
    let mut rest = segment;
    while let Some(start) = rest.find(['{', '}']) {
        if rest[start..].starts_with('}') {
            return None;
        }
        let text = &rest[..start];
        if !params.is_empty() && text.is_empty() {
            return None;
        }
        let after = &rest[start + 1..];
        let end = after.find('}')?;
        let name = after[..end].trim();
        if name.is_empty() || name.contains('{') {
            return None;
        }
        texts.push(text.to_string());
        params.push(name.to_string());
        rest = &after[end + 1..];
    }
    texts.push(rest.to_string());
    Some((texts, params))
}

fn unique_handler(base: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.to_string()) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
