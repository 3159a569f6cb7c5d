//! TypeScript backend: Express on Node 18+

use std::collections::HashMap;

use crate::endpoints::ValueType;
use crate::generation::ir::Route;
use crate::generation::utils::{TYPESCRIPT_KEYWORDS, escape_identifier, to_camel_case, to_snake_case};
use crate::generation::{FileKind, Language, TemplateCondition, TemplateSpec};

use super::LanguageBackend;

const TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec::new(
        "typescript/package.json",
        include_str!("../../../templates/typescript/package.json.tera"),
        "package.json",
        FileKind::Config,
    ),
    TemplateSpec::new(
        "typescript/tsconfig.json",
        include_str!("../../../templates/typescript/tsconfig.json.tera"),
        "tsconfig.json",
        FileKind::Config,
    ),
    TemplateSpec::new(
        "typescript/index.ts",
        include_str!("../../../templates/typescript/index.ts.tera"),
        "src/index.ts",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "typescript/auth.ts",
        include_str!("../../../templates/typescript/auth.ts.tera"),
        "src/auth.ts",
        FileKind::Code,
    )
    .when(TemplateCondition::WhenAuth),
    TemplateSpec::new(
        "typescript/upstream.ts",
        include_str!("../../../templates/typescript/upstream.ts.tera"),
        "src/upstream.ts",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "typescript/handler.ts",
        include_str!("../../../templates/typescript/handler.ts.tera"),
        "src/handlers/{handler}.ts",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "typescript/Dockerfile",
        include_str!("../../../templates/typescript/Dockerfile.tera"),
        "Dockerfile",
        FileKind::Config,
    ),
];

pub struct TypeScriptBackend;

impl LanguageBackend for TypeScriptBackend {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn templates(&self) -> &'static [TemplateSpec] {
        TEMPLATES
    }

    fn handler_name(&self, handler: &str) -> String {
        escape_identifier(&to_camel_case(handler), TYPESCRIPT_KEYWORDS)
    }

    /// Express route parameters allow word characters only
    fn param_ident(&self, name: &str) -> String {
        escape_identifier(&to_snake_case(name), &[])
    }

    fn type_name(&self, value_type: &ValueType) -> String {
        match value_type {
            ValueType::String => "string".to_string(),
            ValueType::Integer | ValueType::Number => "number".to_string(),
            ValueType::Boolean => "boolean".to_string(),
            ValueType::Array { items } => match items.as_ref() {
                ValueType::Array { .. } => format!("Array<{}>", self.type_name(items)),
                other => format!("{}[]", self.type_name(other)),
            },
            ValueType::Object => "Record<string, unknown>".to_string(),
            ValueType::Opaque { .. } => "unknown".to_string(),
        }
    }

    fn mount_path(&self, route: &Route, idents: &HashMap<String, String>) -> String {
        route.mount_path(|name| format!(":{}", idents.get(name).map_or(name, String::as_str)))
    }

    fn run_command(&self) -> &'static str {
        "npm install && npm run build && npm start"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mapping() {
        let backend = TypeScriptBackend;
        assert_eq!(backend.type_name(&ValueType::Integer), "number");
        assert_eq!(
            backend.type_name(&ValueType::Array { items: Box::new(ValueType::String) }),
            "string[]"
        );
        assert_eq!(backend.type_name(&ValueType::opaque("x-custom")), "unknown");
        assert_eq!(backend.param_type(&ValueType::Object), "string");
    }

    #[test]
    fn test_identifiers() {
        let backend = TypeScriptBackend;
        assert_eq!(backend.handler_name("get_pets_by_id"), "getPetsById");
        assert_eq!(backend.handler_name("delete"), "delete_");
        assert_eq!(backend.param_ident("petId"), "pet_id");
        assert_eq!(backend.param_ident("2nd"), "_2nd");
    }
}
