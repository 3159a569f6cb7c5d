//! Python backend: FastAPI served by uvicorn

use std::collections::HashMap;

use crate::endpoints::ValueType;
use crate::generation::ir::Route;
use crate::generation::utils::{PYTHON_KEYWORDS, escape_identifier, to_snake_case};
use crate::generation::{FileKind, Language, TemplateCondition, TemplateSpec};

use super::LanguageBackend;

const TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec::new(
        "python/requirements.txt",
        include_str!("../../../templates/python/requirements.txt.tera"),
        "requirements.txt",
        FileKind::Config,
    ),
    TemplateSpec::new(
        "python/main.py",
        include_str!("../../../templates/python/main.py.tera"),
        "main.py",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "python/auth.py",
        include_str!("../../../templates/python/auth.py.tera"),
        "auth.py",
        FileKind::Code,
    )
    .when(TemplateCondition::WhenAuth),
    TemplateSpec::new(
        "python/upstream.py",
        include_str!("../../../templates/python/upstream.py.tera"),
        "upstream.py",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "python/handlers_init.py",
        include_str!("../../../templates/python/handlers_init.py.tera"),
        "handlers/__init__.py",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "python/handler.py",
        include_str!("../../../templates/python/handler.py.tera"),
        "handlers/{handler}.py",
        FileKind::Code,
    ),
    TemplateSpec::new(
        "python/Dockerfile",
        include_str!("../../../templates/python/Dockerfile.tera"),
        "Dockerfile",
        FileKind::Config,
    ),
];

pub struct PythonBackend;

impl LanguageBackend for PythonBackend {
    fn language(&self) -> Language {
        Language::Python
    }

    fn templates(&self) -> &'static [TemplateSpec] {
        TEMPLATES
    }

    fn handler_name(&self, handler: &str) -> String {
        escape_identifier(handler, PYTHON_KEYWORDS)
    }

    fn file_stem(&self, handler: &str) -> String {
        self.handler_name(handler)
    }

    fn param_ident(&self, name: &str) -> String {
        escape_identifier(&to_snake_case(name), PYTHON_KEYWORDS)
    }

    fn type_name(&self, value_type: &ValueType) -> String {
        match value_type {
            ValueType::String => "str".to_string(),
            ValueType::Integer => "int".to_string(),
            ValueType::Number => "float".to_string(),
            ValueType::Boolean => "bool".to_string(),
            ValueType::Array { items } => format!("List[{}]", self.type_name(items)),
            ValueType::Object => "Dict[str, Any]".to_string(),
            ValueType::Opaque { .. } => "Any".to_string(),
        }
    }

    fn mount_path(&self, route: &Route, idents: &HashMap<String, String>) -> String {
        route.mount_path(|name| format!("{{{}}}", idents.get(name).map_or(name, String::as_str)))
    }

    fn run_command(&self) -> &'static str {
        "pip install -r requirements.txt && python main.py"
    }
}
