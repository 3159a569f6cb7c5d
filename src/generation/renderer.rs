//! Tera-based rendering of embedded templates into server files

use std::error::Error as StdError;

use serde_json::Value as JsonValue;
use tera::Tera;
use tracing::debug;

use crate::generation::{FileKind, GenerationError, Language, ProjectFileSet, RenderContext, ServerFile};

/// When a template contributes a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateCondition {
    Always,
    /// Only when the server enforces authentication
    WhenAuth,
}

/// One embedded template and where its output goes.
///
/// `output` may contain `{handler}`; such templates are rendered once per
/// route with the route exposed as `route`.
#[derive(Debug, Clone, Copy)]
pub struct TemplateSpec {
    pub name: &'static str,
    pub source: &'static str,
    pub output: &'static str,
    pub kind: FileKind,
    pub condition: TemplateCondition,
}

impl TemplateSpec {
    pub const fn new(name: &'static str, source: &'static str, output: &'static str, kind: FileKind) -> Self {
        Self {
            name,
            source,
            output,
            kind,
            condition: TemplateCondition::Always,
        }
    }

    pub const fn when(mut self, condition: TemplateCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn per_route(&self) -> bool {
        self.output.contains("{handler}")
    }
}

/// Compiled template set of one backend
pub struct TemplateRenderer {
    tera: Tera,
    specs: Vec<TemplateSpec>,
}

impl TemplateRenderer {
    pub fn new(specs: &[TemplateSpec]) -> Result<Self, GenerationError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(specs.iter().map(|spec| (spec.name, spec.source)))
            .map_err(|e| GenerationError::TemplateError(describe(&e)))?;
        Ok(Self {
            tera,
            specs: specs.to_vec(),
        })
    }

    pub fn render(&self, name: &str, context: &RenderContext) -> Result<String, GenerationError> {
        let tera_context = context.to_tera_context()?;
        self.tera
            .render(name, &tera_context)
            .map_err(|e| GenerationError::RenderError(format!("{name}: {}", describe(&e))))
    }

    /// Render every applicable template into `files`.
    ///
    /// `context` must carry `auth.enabled` and a `routes` array whose items
    /// have a `file_stem`.
    pub fn render_into(
        &self,
        context: &RenderContext,
        language: Language,
        files: &mut ProjectFileSet,
    ) -> Result<(), GenerationError> {
        let auth_enabled = context
            .get("auth")
            .and_then(|auth| auth.get("enabled"))
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        let routes = context
            .get("routes")
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default();

        for spec in &self.specs {
            let applies = match spec.condition {
                TemplateCondition::Always => true,
                TemplateCondition::WhenAuth => auth_enabled,
            };
            if !applies {
                debug!(template = spec.name, "Template condition not met, skipping");
                continue;
            }

            if spec.per_route() {
                for route in &routes {
                    let stem = route
                        .get("file_stem")
                        .and_then(JsonValue::as_str)
                        .ok_or_else(|| GenerationError::RenderError("route without file_stem".to_string()))?;
                    let scoped = context.with_variable("route", route.clone());
                    let content = self.render(spec.name, &scoped)?;
                    let path = spec.output.replace("{handler}", stem);
                    files.push(ServerFile::new(path, content, spec.kind).with_language(language))?;
                }
            } else {
                let content = self.render(spec.name, context)?;
                files.push(ServerFile::new(spec.output, content, spec.kind).with_language(language))?;
            }
        }
        Ok(())
    }
}

/// Tera errors keep the useful part in their source chain
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
