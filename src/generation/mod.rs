//! Generation domain: turns a [`ServerConfig`](crate::server::ServerConfig)
//! into a complete MCP server project.
//!
//! The config is lowered once into a [`ServerIr`] route table. Each
//! [`LanguageBackend`] projects that table into a template context and
//! renders its embedded Tera templates; shared metadata files are added on
//! top. Generation is synchronous and deterministic.

pub mod backends;
pub mod context;
pub mod errors;
pub mod ir;
pub mod metadata;
pub mod orchestrator;
pub mod renderer;
pub mod rules;
pub mod sanitizers;
pub mod types;
pub mod utils;

pub use backends::{BackendRegistry, LanguageBackend};
pub use context::RenderContext;
pub use errors::GenerationError;
pub use ir::{Route, RouteKind, ServerIr};
pub use orchestrator::{GenerateOptions, Generator};
pub use renderer::{TemplateCondition, TemplateRenderer, TemplateSpec};
pub use types::{FileKind, GenerationOutcome, Language, ProjectFileSet, ServerFile};
