//! Rust backend: axum 0.8 on tokio

use std::collections::HashMap;

use serde_json::json;

use crate::endpoints::ValueType;
use crate::generation::ir::{Route, ServerIr};
use crate::generation::utils::{RUST_KEYWORDS, escape_identifier, sanitize_rust_field_name};
use crate::generation::{FileKind, Language, RenderContext, TemplateCondition, TemplateSpec};

use super::LanguageBackend;

const TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec::new(
        "rust/Cargo.toml",
        include_str!("../../../templates/rust/Cargo.toml.tera"),
        "Cargo.toml",
        FileKind::Config,
    ),
    TemplateSpec::new(
        "rust/main.rs",
        include_str!("../../../templates/rust/main.rs.tera"),
        "src/main.rs",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "rust/auth.rs",
        include_str!("../../../templates/rust/auth.rs.tera"),
        "src/auth.rs",
        FileKind::Code,
    )
    .when(TemplateCondition::WhenAuth),
    TemplateSpec::new(
        "rust/upstream.rs",
        include_str!("../../../templates/rust/upstream.rs.tera"),
        "src/upstream.rs",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "rust/handlers_mod.rs",
        include_str!("../../../templates/rust/handlers_mod.rs.tera"),
        "src/handlers/mod.rs",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "rust/handler.rs",
        include_str!("../../../templates/rust/handler.rs.tera"),
        "src/handlers/{handler}.rs",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "rust/Dockerfile",
        include_str!("../../../templates/rust/Dockerfile.tera"),
        "Dockerfile",
        FileKind::Config,
    ),
];

pub struct RustBackend;

impl LanguageBackend for RustBackend {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn templates(&self) -> &'static [TemplateSpec] {
        TEMPLATES
    }

    fn handler_name(&self, handler: &str) -> String {
        escape_identifier(handler, RUST_KEYWORDS)
    }

    /// Handler modules share the function name
    fn file_stem(&self, handler: &str) -> String {
        self.handler_name(handler)
    }

    /// Field of the extractor struct; axum matches path wildcards by this name
    fn param_ident(&self, name: &str) -> String {
        sanitize_rust_field_name(name)
    }

    fn type_name(&self, value_type: &ValueType) -> String {
        match value_type {
            ValueType::String => "String".to_string(),
            ValueType::Integer => "i64".to_string(),
            ValueType::Number => "f64".to_string(),
            ValueType::Boolean => "bool".to_string(),
            ValueType::Array { items } => format!("Vec<{}>", self.type_name(items)),
            ValueType::Object => "serde_json::Map<String, serde_json::Value>".to_string(),
            ValueType::Opaque { .. } => "serde_json::Value".to_string(),
        }
    }

    fn mount_path(&self, route: &Route, idents: &HashMap<String, String>) -> String {
        route.mount_path(|name| ["{", idents.get(name).map_or(name, String::as_str), "}"].concat())
    }

    /// Debug formatting yields a valid Rust string literal
    fn string_literal(&self, value: &str) -> String {
        format!("{value:?}")
    }

    fn extend_context(&self, ir: &ServerIr, context: &mut RenderContext) {
        context.add_variable("cargo", json!({ "version": cargo_version(&ir.version) }));
    }

    fn run_command(&self) -> &'static str {
        "cargo run --release"
    }
}

/// Cargo only accepts semver versions; anything else falls back to 0.1.0
fn cargo_version(version: &str) -> String {
    let core = version.split(['-', '+']).next().unwrap_or_default();
    let parts: Vec<&str> = core.split('.').collect();
    let numeric = |part: &&str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    if parts.len() == 3 && parts.iter().all(numeric) {
        core.to_string()
    } else {
        "0.1.0".to_string()
    }
}
