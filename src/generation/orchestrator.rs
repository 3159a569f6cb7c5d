//! Generation orchestration: config to IR to rendered project

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::Diagnostics;
use crate::generation::backends::{BackendRegistry, build_context};
use crate::generation::ir::ServerIr;
use crate::generation::metadata::{SHARED_TEMPLATES, metadata_files};
use crate::generation::{GenerationError, GenerationOutcome, ProjectFileSet, TemplateRenderer, TemplateSpec};
use crate::server::ServerConfig;

/// Per-call knobs that do not belong to the server configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Stamped into `deploy.json` as `generatedAt`; generated sources never
    /// carry a timestamp
    pub generated_at: Option<DateTime<Utc>>,
}

impl GenerateOptions {
    pub fn stamped_now() -> Self {
        Self {
            generated_at: Some(Utc::now()),
        }
    }
}

/// Runs the generation workflow against a backend registry
#[derive(Clone, Default)]
pub struct Generator {
    registry: BackendRegistry,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: BackendRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &BackendRegistry {
        &self.registry
    }

    /// Generate a complete project. All or nothing: on any error the outcome
    /// carries no files.
    pub fn generate(&self, config: &ServerConfig, options: &GenerateOptions) -> GenerationOutcome {
        let mut diagnostics = Diagnostics::new();
        match self.try_generate(config, options, &mut diagnostics) {
            Ok(files) => GenerationOutcome::succeeded(files, diagnostics.into_vec()),
            Err(err) => {
                warn!(error = %err, language = %config.language, "Generation failed");
                GenerationOutcome::failed(err, diagnostics.into_vec())
            }
        }
    }

    pub fn try_generate(
        &self,
        config: &ServerConfig,
        options: &GenerateOptions,
        diagnostics: &mut Diagnostics,
    ) -> Result<ProjectFileSet, GenerationError> {
        let backend = self.registry.get(config.language)?;
        config
            .validate()
            .map_err(|e| GenerationError::ValidationError(e.to_string()))?;

        let ir = ServerIr::build(config, diagnostics)?;
        let context = build_context(backend.as_ref(), &ir);
        debug!(language = %config.language, routes = ir.routes.len(), "Rendering project");

        let specs: Vec<TemplateSpec> = backend
            .templates()
            .iter()
            .chain(SHARED_TEMPLATES)
            .copied()
            .collect();
        let renderer = TemplateRenderer::new(&specs)?;

        let mut files = ProjectFileSet::new();
        renderer.render_into(&context, config.language, &mut files)?;
        for file in metadata_files(
            &ir,
            config.language,
            config.authentication.secret(),
            options.generated_at,
        )? {
            files.push(file)?;
        }

        info!(
            server = %ir.name,
            language = %config.language,
            files = files.len(),
            "Generated MCP server project"
        );
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{Endpoint, EndpointParameter, HttpMethod, McpType, ParameterLocation, ValueType};
    use crate::generation::Language;
    use crate::server::{Authentication, KeyLocation};
    use tracing_test::traced_test;

    fn pets(language: Language) -> ServerConfig {
        let mut get = Endpoint::new(HttpMethod::Get, "/pets/{petId}");
        get.id = "ep_get".to_string();
        get.mcp_type = McpType::Resource;
        get.summary = "Info for a specific pet".to_string();
        get.parameters = vec![EndpointParameter::new("petId", ParameterLocation::Path, ValueType::Integer)];

        let mut list = Endpoint::new(HttpMethod::Get, "/pets");
        list.id = "ep_list".to_string();
        list.mcp_type = McpType::Resource;
        list.parameters = vec![EndpointParameter::new("limit", ParameterLocation::Query, ValueType::Integer)];

        let mut create = Endpoint::new(HttpMethod::Post, "/pets");
        create.id = "ep_create".to_string();
        create.mcp_type = McpType::Tool;

        ServerConfig::new("Pet Store", language)
            .with_authentication(Authentication::api_key(KeyLocation::Header, None))
            .with_endpoints(vec![get, list, create])
    }

    #[test]
    fn test_every_language_generates_a_complete_project() {
        let generator = Generator::new();
        for language in Language::all() {
            let outcome = generator.generate(&pets(*language), &GenerateOptions::default());
            assert!(outcome.success, "{language}: {:?}", outcome.error);
            let files = outcome.files.unwrap();
            for shared in ["README.md", "Dockerfile", "mcp-manifest.json", "deploy.json", ".env.example"] {
                assert!(files.get(shared).is_some(), "{language} is missing {shared}");
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let generator = Generator::new();
        for language in Language::all() {
            let first = generator.generate(&pets(*language), &GenerateOptions::default());
            let second = generator.generate(&pets(*language), &GenerateOptions::default());
            assert_eq!(first.files, second.files);
        }
    }

    #[test]
    #[traced_test]
    fn test_generation_is_logged() {
        let outcome = Generator::new().generate(&pets(Language::Rust), &GenerateOptions::default());
        assert!(outcome.success);
        assert!(logs_contain("Generated MCP server project"));
        assert!(logs_contain("language=rust"));
    }

    #[test]
    fn test_unsupported_language_yields_no_files() {
        let generator = Generator::with_registry(BackendRegistry::empty());
        let outcome = generator.generate(&pets(Language::Go), &GenerateOptions::default());
        assert!(!outcome.success);
        assert!(outcome.files.is_none());
        assert!(outcome.error.unwrap().contains("Unsupported language"));
    }

    #[test]
    fn test_generated_at_only_touches_deploy_metadata() {
        let generator = Generator::new();
        let plain = generator
            .generate(&pets(Language::TypeScript), &GenerateOptions::default())
            .files
            .unwrap();
        let stamped = generator
            .generate(&pets(Language::TypeScript), &GenerateOptions::stamped_now())
            .files
            .unwrap();
        for file in plain.iter() {
            let other = stamped.get(&file.path).unwrap();
            if file.path == "deploy.json" {
                assert!(other.content.contains("generatedAt"));
            } else {
                assert_eq!(file.content, other.content, "{} differs", file.path);
            }
        }
    }

    #[test]
    fn test_auth_file_follows_authentication() {
        let generator = Generator::new();
        let secured = generator
            .generate(&pets(Language::Python), &GenerateOptions::default())
            .files
            .unwrap();
        assert!(secured.get("auth.py").is_some());

        let open = pets(Language::Python).with_authentication(Authentication::None);
        let files = generator.generate(&open, &GenerateOptions::default()).files.unwrap();
        assert!(files.get("auth.py").is_none());
        assert!(!files.get("main.py").unwrap().content.contains("require_auth"));
    }

    #[test]
    fn test_skipped_endpoints_surface_as_warnings() {
        let mut config = pets(Language::Go);
        config.endpoints.push(Endpoint::new(HttpMethod::Get, "pets"));
        config.endpoints[3].mcp_type = McpType::Resource;
        let outcome = Generator::new().generate(&config, &GenerateOptions::default());
        assert!(outcome.success);
        assert!(outcome.warnings.iter().any(|w| w.message.contains("start with")));
    }
}
