//! Render context handed to the template engine

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::generation::GenerationError;

/// Variables visible to a template, kept as one JSON object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    data: Map<String, JsonValue>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, key: &str, value: JsonValue) {
        self.data.insert(key.to_string(), value);
    }

    /// Serialize `value` and add it under `key`
    pub fn add_serialized<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), GenerationError> {
        self.data.insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    pub fn has_variable(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Copy of this context with one extra variable, used for per-route files
    pub fn with_variable(&self, key: &str, value: JsonValue) -> Self {
        let mut scoped = self.clone();
        scoped.add_variable(key, value);
        scoped
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, GenerationError> {
        tera::Context::from_value(JsonValue::Object(self.data.clone()))
            .map_err(|e| GenerationError::TemplateError(e.to_string()))
    }
}
