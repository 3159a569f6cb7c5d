//! Language-independent project files: MCP manifest, deployment metadata and
//! the environment template.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value as JsonValue, json};

use crate::generation::ir::{Route, RouteKind, ServerIr};
use crate::generation::{
    FileKind, GenerationError, Language, ServerFile, TemplateSpec,
};

pub const MANIFEST_FILE: &str = "mcp-manifest.json";
pub const DEPLOY_FILE: &str = "deploy.json";
pub const ENV_EXAMPLE_FILE: &str = ".env.example";

/// Templates rendered for every language with the backend's context
pub const SHARED_TEMPLATES: &[TemplateSpec] = &[TemplateSpec::new(
    "shared/README",
    include_str!("../../templates/shared/README.md.tera"),
    "README.md",
    FileKind::Documentation,
)];

fn route_entry(route: &Route) -> JsonValue {
    let parameters: Vec<JsonValue> = route
        .path_params
        .iter()
        .map(|p| (p, "path"))
        .chain(route.query_params.iter().map(|p| (p, "query")))
        .map(|(p, location)| {
            json!({
                "name": p.name,
                "in": location,
                "type": p.value_type,
                "required": p.required,
            })
        })
        .collect();

    json!({
        "id": route.endpoint_id,
        "handler": route.handler,
        "route": route.public_path(),
        "method": route.method,
        "path": route.path,
        "summary": route.summary,
        "parameters": parameters,
    })
}

/// Structural description of the server: identity, auth and capabilities
pub fn manifest(ir: &ServerIr, language: Language) -> JsonValue {
    let entries = |kind| ir.routes_of(kind).map(route_entry).collect::<Vec<_>>();
    let mut authentication = json!({ "type": ir.auth.kind });
    if let Some(location) = ir.auth.location {
        authentication["location"] = json!(location);
    }
    if let Some(name) = &ir.auth.key_name {
        authentication["name"] = json!(name);
    }
    if let Some(env_var) = ir.auth.env_var {
        authentication["envVar"] = json!(env_var);
    }

    json!({
        "name": ir.name,
        "version": ir.version,
        "description": ir.description,
        "language": language,
        "framework": language.framework(),
        "authentication": authentication,
        "capabilities": {
            "resources": entries(RouteKind::Resource),
            "tools": entries(RouteKind::Tool),
        },
    })
}

/// Hosting metadata; `generatedAt` only appears when a timestamp is given
pub fn deploy(ir: &ServerIr, language: Language, generated_at: Option<DateTime<Utc>>) -> JsonValue {
    let mut deploy = json!({
        "name": ir.name,
        "packageName": ir.package_name,
        "version": ir.version,
        "language": language,
        "hosting": ir.hosting,
        "port": 3000,
    });
    if let Some(at) = generated_at {
        deploy["generatedAt"] = json!(at.to_rfc3339_opts(SecondsFormat::Secs, true));
    }
    deploy
}

/// `.env.example`; the configured secret, if any, pre-fills the auth variable
pub fn env_example(ir: &ServerIr, secret: Option<&str>) -> String {
    let mut lines = vec![
        "# Port the MCP server listens on".to_string(),
        "PORT=3000".to_string(),
        "# Base URL of the wrapped API; leave empty to describe calls instead of making them".to_string(),
        format!("API_BASE_URL={}", ir.upstream_base_url.as_deref().unwrap_or_default()),
        "# Authorization header value sent to the wrapped API".to_string(),
        "UPSTREAM_AUTHORIZATION=".to_string(),
    ];
    if let Some(env_var) = ir.auth.env_var {
        lines.push("# Credential MCP clients must present; empty accepts any well-formed credential".to_string());
        lines.push(format!("{env_var}={}", secret.unwrap_or_default()));
    }
    lines.push(String::new());
    lines.join("\n")
}

fn pretty(value: &JsonValue) -> Result<String, GenerationError> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    Ok(text)
}

/// Every metadata file of a project, in output order
pub fn metadata_files(
    ir: &ServerIr,
    language: Language,
    secret: Option<&str>,
    generated_at: Option<DateTime<Utc>>,
) -> Result<Vec<ServerFile>, GenerationError> {
    Ok(vec![
        ServerFile::new(MANIFEST_FILE, pretty(&manifest(ir, language))?, FileKind::Config),
        ServerFile::new(DEPLOY_FILE, pretty(&deploy(ir, language, generated_at))?, FileKind::Config),
        ServerFile::new(ENV_EXAMPLE_FILE, env_example(ir, secret), FileKind::Config),
    ])
}
