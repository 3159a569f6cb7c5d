//! Go backend: standard library `net/http` with Go 1.22 routing patterns

use std::collections::HashMap;

use crate::endpoints::ValueType;
use crate::generation::ir::Route;
use crate::generation::utils::{GO_KEYWORDS, escape_identifier, to_proper_case};
use crate::generation::{FileKind, Language, TemplateCondition, TemplateSpec};

use super::LanguageBackend;

const TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec::new(
        "go/go.mod",
        include_str!("../../../templates/go/go.mod.tera"),
        "go.mod",
        FileKind::Config,
    ),
    TemplateSpec::new(
        "go/main.go",
        include_str!("../../../templates/go/main.go.tera"),
        "main.go",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "go/auth.go",
        include_str!("../../../templates/go/auth.go.tera"),
        "auth.go",
        FileKind::Code,
    )
    .when(TemplateCondition::WhenAuth),
    TemplateSpec::new(
        "go/upstream.go",
        include_str!("../../../templates/go/upstream.go.tera"),
        "upstream.go",
        FileKind::Code,
    ),
    // `_handler.go` keeps file names clear of the `_test` and GOOS/GOARCH suffixes
    TemplateSpec::new(
        "go/handler.go",
        include_str!("../../../templates/go/handler.go.tera"),
        "{handler}_handler.go",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "go/Dockerfile",
        include_str!("../../../templates/go/Dockerfile.tera"),
        "Dockerfile",
        FileKind::Config,
    ),
];

pub struct GoBackend;

impl LanguageBackend for GoBackend {
    fn language(&self) -> Language {
        Language::Go
    }

    fn templates(&self) -> &'static [TemplateSpec] {
        TEMPLATES
    }

    fn handler_name(&self, handler: &str) -> String {
        format!("handle{}", to_proper_case(handler))
    }

    /// Exported struct field name; also used as the path wildcard name
    fn param_ident(&self, name: &str) -> String {
        let proper = to_proper_case(name);
        match proper.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => escape_identifier(&proper, GO_KEYWORDS),
            _ => format!("P{proper}"),
        }
    }

    fn type_name(&self, value_type: &ValueType) -> String {
        match value_type {
            ValueType::String => "string".to_string(),
            ValueType::Integer => "int64".to_string(),
            ValueType::Number => "float64".to_string(),
            ValueType::Boolean => "bool".to_string(),
            ValueType::Array { items } => format!("[]{}", self.type_name(items)),
            ValueType::Object | ValueType::Opaque { .. } => "interface{}".to_string(),
        }
    }

    fn mount_path(&self, route: &Route, idents: &HashMap<String, String>) -> String {
        let path = route.mount_path(|name| format!("{{{}}}", idents.get(name).map_or(name, String::as_str)));
        // a trailing slash would otherwise match the whole subtree
        let path = if path.ends_with('/') { format!("{path}{{$}}") } else { path };
        format!("{} {path}", route.kind.http_method())
    }

    fn run_command(&self) -> &'static str {
        "go run ."
    }
}
