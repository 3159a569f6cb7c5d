//! Language backends.
//!
//! A backend owns its embedded templates and the naming and typing rules of
//! its language. The route table itself comes from [`ServerIr`]; the shared
//! [`build_context`] projects it through a backend so every language renders
//! the same routes.

mod go;
mod python;
mod rust;
mod typescript;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::{Value as JsonValue, json};

use crate::endpoints::ValueType;
use crate::generation::ir::{PathSegment, Route, RouteKind, RouteParam, ServerIr};
use crate::generation::utils::to_proper_case;
use crate::generation::{GenerationError, Language, RenderContext, TemplateSpec};

pub use go::GoBackend;
pub use python::PythonBackend;
pub use rust::RustBackend;
pub use typescript::TypeScriptBackend;

/// Language-specific half of code generation
pub trait LanguageBackend: Send + Sync {
    fn language(&self) -> Language;

    fn templates(&self) -> &'static [TemplateSpec];

    /// Identifier of the handler function for a snake_case handler name
    fn handler_name(&self, handler: &str) -> String;

    /// File stem of the per-route handler file
    fn file_stem(&self, handler: &str) -> String {
        handler.to_string()
    }

    /// Identifier a parameter is bound to in generated code
    fn param_ident(&self, name: &str) -> String;

    /// Full type mapping, used in parameter documentation
    fn type_name(&self, value_type: &ValueType) -> String;

    /// Type a parameter is parsed into; composite and opaque values travel as
    /// raw strings
    fn param_type(&self, value_type: &ValueType) -> String {
        match value_type {
            ValueType::Integer | ValueType::Number | ValueType::Boolean | ValueType::String => {
                self.type_name(value_type)
            }
            _ => self.type_name(&ValueType::String),
        }
    }

    /// Route pattern on the generated server; `idents` maps placeholder names
    /// to parameter identifiers
    fn mount_path(&self, route: &Route, idents: &HashMap<String, String>) -> String;

    fn string_literal(&self, value: &str) -> String {
        serde_json::Value::String(value.to_string()).to_string()
    }

    /// Backend-only variables, e.g. a manifest-safe version string
    fn extend_context(&self, _ir: &ServerIr, _context: &mut RenderContext) {}

    /// Command printed in the README to start the server
    fn run_command(&self) -> &'static str;
}

/// Scalar kind a generated handler parses a parameter into
pub fn param_kind(value_type: &ValueType) -> &'static str {
    match value_type {
        ValueType::String => "string",
        ValueType::Integer => "integer",
        ValueType::Number => "number",
        ValueType::Boolean => "boolean",
        _ => "raw",
    }
}

/// Registry of backends keyed by language
#[derive(Clone)]
pub struct BackendRegistry {
    backends: HashMap<Language, Arc<dyn LanguageBackend>>,
}

impl BackendRegistry {
    /// Registry without any backend
    pub fn empty() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    pub fn register(&mut self, backend: Arc<dyn LanguageBackend>) {
        self.backends.insert(backend.language(), backend);
    }

    pub fn get(&self, language: Language) -> Result<Arc<dyn LanguageBackend>, GenerationError> {
        self.backends
            .get(&language)
            .cloned()
            .ok_or_else(|| GenerationError::UnsupportedLanguage(language.to_string()))
    }

    pub fn supported_languages(&self) -> Vec<Language> {
        let mut languages: Vec<_> = self.backends.keys().copied().collect();
        languages.sort();
        languages
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(TypeScriptBackend));
        registry.register(Arc::new(PythonBackend));
        registry.register(Arc::new(GoBackend));
        registry.register(Arc::new(RustBackend));
        registry
    }
}

/// Project the IR through a backend into template variables
pub fn build_context(backend: &dyn LanguageBackend, ir: &ServerIr) -> RenderContext {
    let literal = |value: &str| backend.string_literal(value);
    let mut context = RenderContext::new();

    context.add_variable(
        "server",
        json!({
            "name": ir.name,
            "name_literal": literal(&ir.name),
            "package_name": ir.package_name,
            "description": ir.description,
            "description_literal": literal(&ir.description),
            "version": ir.version,
            "version_literal": literal(&ir.version),
            "language": backend.language().display_name(),
            "framework": backend.language().framework(),
            "run_command": backend.run_command(),
        }),
    );

    context.add_variable(
        "auth",
        json!({
            "enabled": ir.auth.is_enabled(),
            "kind": ir.auth.kind,
            "location": ir.auth.location,
            "key_name": ir.auth.key_name,
            "key_name_literal": ir.auth.key_name.as_deref().map(literal),
            "env_var": ir.auth.env_var,
        }),
    );

    let listing = |kind: RouteKind| -> Vec<JsonValue> {
        ir.capability_paths(kind)
            .into_iter()
            .map(|path| json!({"path": path, "literal": literal(path)}))
            .collect()
    };
    context.add_variable("resources", JsonValue::Array(listing(RouteKind::Resource)));
    context.add_variable("tools", JsonValue::Array(listing(RouteKind::Tool)));

    let routes: Vec<JsonValue> = ir.routes.iter().map(|route| route_context(backend, route)).collect();
    context.add_variable("routes", JsonValue::Array(routes));

    backend.extend_context(ir, &mut context);
    context
}

fn route_context(backend: &dyn LanguageBackend, route: &Route) -> JsonValue {
    let literal = |value: &str| backend.string_literal(value);

    // placeholder name -> (1-based pattern index, position) inside text-mixed segments
    let patterns: Vec<_> = route
        .segments
        .iter()
        .filter_map(|segment| match segment {
            PathSegment::Mixed(pattern) => Some(pattern),
            _ => None,
        })
        .collect();
    let mut captured = HashMap::new();
    for (index, pattern) in patterns.iter().enumerate() {
        for (position, name) in pattern.params.iter().enumerate() {
            captured.insert(name.as_str(), (index + 1, position));
        }
    }

    let mut taken = HashSet::new();
    let mut claim = |name: &str| -> String {
        let base = backend.param_ident(name);
        let mut ident = base.clone();
        let mut n = 2;
        while !taken.insert(ident.clone()) {
            ident = format!("{base}_{n}");
            n += 1;
        }
        ident
    };
    let mut idents = HashMap::new();
    let mut param_json = |param: &RouteParam, location: &str| -> JsonValue {
        let ident = claim(&param.name);
        let segment = captured.get(param.name.as_str()).filter(|_| location == "path");
        if location == "path" && segment.is_none() {
            idents.insert(param.name.clone(), ident.clone());
        }
        let json_name = if param.name.contains(['"', '`', '\\', ',']) {
            ident.clone()
        } else {
            param.name.clone()
        };
        json!({
            "name": param.name,
            "name_literal": literal(&param.name),
            "json_name": json_name,
            "ident": ident,
            "ident_literal": literal(&ident),
            "location": location,
            "kind": param_kind(&param.value_type),
            "type": backend.param_type(&param.value_type),
            "doc_type": backend.type_name(&param.value_type),
            "required": param.required,
            "description": param.description,
            "segment": segment.map(|(index, position)| json!({"index": index, "position": position})),
        })
    };

    let path_params: Vec<JsonValue> = route.path_params.iter().map(|p| param_json(p, "path")).collect();
    let query_params: Vec<JsonValue> = route.query_params.iter().map(|p| param_json(p, "query")).collect();
    let captures: Vec<JsonValue> = patterns
        .iter()
        .enumerate()
        .map(|(index, pattern)| {
            let ident = claim(&pattern.wildcard);
            idents.insert(pattern.wildcard.clone(), ident.clone());
            json!({
                "index": index + 1,
                "ident": ident,
                "ident_literal": literal(&ident),
                "template": pattern.template(),
                "texts": pattern.texts.iter().map(|text| literal(text)).collect::<Vec<_>>(),
            })
        })
        .collect();
    let needs_conversion = route
        .path_params
        .iter()
        .chain(&route.query_params)
        .any(|p| !matches!(param_kind(&p.value_type), "string" | "raw"));

    let has_captures = !captures.is_empty();
    let mount_path = backend.mount_path(route, &idents);
    let params: Vec<JsonValue> = path_params.iter().chain(&query_params).cloned().collect();

    json!({
        "endpoint_id": route.endpoint_id,
        "endpoint_id_literal": literal(&route.endpoint_id),
        "handler": route.handler,
        "fn_name": backend.handler_name(&route.handler),
        "file_stem": backend.file_stem(&route.handler),
        "type_name": to_proper_case(&route.handler),
        "kind": route.kind.as_str(),
        "method": route.method.as_str(),
        "path": route.path,
        "path_literal": literal(&route.path),
        "route_path": route.public_path(),
        "mount_path": mount_path,
        "mount_path_literal": literal(&mount_path),
        "summary": route.summary,
        "description": route.description,
        "path_params": path_params,
        "query_params": query_params,
        "params": params,
        "has_captures": has_captures,
        "captures": captures,
        "has_path_params": !route.path_params.is_empty(),
        "has_query_params": !route.query_params.is_empty(),
        "needs_conversion": needs_conversion,
    })
}
