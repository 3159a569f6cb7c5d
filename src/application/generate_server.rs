//! Use case for generating MCP servers

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::application::{DefinitionLoader, IngestReport, OutputService, ingest};
use crate::core::{Diagnostic, Diagnostics, Error, Result};
use crate::endpoints::Endpoint;
use crate::generation::{GenerateOptions, GenerationOutcome, Generator, Language};
use crate::server::{Authentication, ServerConfig};

/// Generate a project with the built-in backends
pub fn generate(config: &ServerConfig, options: &GenerateOptions) -> GenerationOutcome {
    Generator::new().generate(config, options)
}

/// Generate from a configuration document as sent by an editing front end.
///
/// Endpoints the document could not describe are reported as warnings of
/// the outcome; a structurally broken document is an error.
pub fn generate_from_json(content: &str, options: &GenerateOptions) -> Result<GenerationOutcome> {
    let mut diagnostics = Diagnostics::new();
    let config = ServerConfig::from_json(content, &mut diagnostics)?;
    let mut outcome = generate(&config, options);
    let mut warnings = diagnostics.into_vec();
    warnings.append(&mut outcome.warnings);
    outcome.warnings = warnings;
    Ok(outcome)
}

/// Default configuration for an ingested definition: every endpoint
/// selected, identity and upstream URL taken from the definition
pub fn config_from_report(report: &IngestReport, name: Option<&str>, language: Language) -> ServerConfig {
    let name = name
        .map(str::to_string)
        .or_else(|| report.info.title.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| "MCP Server".to_string());
    let mut config = ServerConfig::new(name, language).with_endpoints(report.endpoints.clone());
    if let Some(description) = &report.info.description {
        config = config.with_description(description.clone());
    }
    if let Some(version) = report.info.version.as_ref().filter(|v| !v.trim().is_empty()) {
        config.version = version.clone();
    }
    if let Some(base_url) = &report.info.base_url {
        config = config.with_upstream_base_url(base_url.clone());
    }
    config
}

/// Request of the end-to-end generation use case
#[derive(Debug, Clone)]
pub struct GenerateServerRequest {
    /// File path or URL of the definition
    pub source: String,
    pub language: Language,
    pub name: Option<String>,
    pub authentication: Authentication,
    /// Configuration document overriding the derived defaults; its endpoint
    /// list, when empty, is filled from the definition
    pub server_config: Option<String>,
    pub output_dir: PathBuf,
    pub options: GenerateOptions,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateServerResponse {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub endpoints: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Load, ingest, configure, generate and write in one call
pub struct GenerateServerUseCase {
    loader: Arc<dyn DefinitionLoader>,
    output: Arc<dyn OutputService>,
    generator: Generator,
}

impl GenerateServerUseCase {
    pub fn new(loader: Arc<dyn DefinitionLoader>, output: Arc<dyn OutputService>) -> Self {
        Self {
            loader,
            output,
            generator: Generator::new(),
        }
    }

    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = generator;
        self
    }

    pub async fn execute(&self, request: GenerateServerRequest) -> Result<GenerateServerResponse> {
        let raw = self.loader.load(&request.source).await?;
        let report = ingest(&raw)?;
        let mut diagnostics = report.diagnostics.clone();

        let config = match &request.server_config {
            Some(content) => {
                let mut config_diagnostics = Diagnostics::new();
                let mut config = ServerConfig::from_json(content, &mut config_diagnostics)?;
                if config.endpoints.is_empty() {
                    config.endpoints = report.endpoints.clone();
                }
                diagnostics.extend(config_diagnostics.into_vec());
                config
            }
            None => config_from_report(&report, request.name.as_deref(), request.language)
                .with_authentication(request.authentication.clone()),
        };
        debug!(
            name = %config.name,
            language = %config.language,
            selected = config.selected_endpoints().count(),
            "Server configuration ready"
        );

        let outcome = self.generator.generate(&config, &request.options);
        diagnostics.extend(outcome.warnings);
        let files = match (outcome.success, outcome.files) {
            (true, Some(files)) => files,
            _ => {
                return Err(Error::GenerationFailure(
                    outcome.error.unwrap_or_else(|| "no files produced".to_string()),
                ));
            }
        };

        let written = self.output.write_project(&request.output_dir, &files).await?;
        info!(
            output_dir = %request.output_dir.display(),
            files = written.len(),
            "Wrote generated server"
        );

        Ok(GenerateServerResponse {
            output_dir: request.output_dir,
            files: written,
            endpoints: count_routes(&config.endpoints),
            diagnostics,
        })
    }
}

fn count_routes(endpoints: &[Endpoint]) -> usize {
    endpoints
        .iter()
        .filter(|e| e.selected && e.mcp_type != crate::endpoints::McpType::None)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::RawDefinition;
    use crate::generation::ProjectFileSet;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    const PETS: &str = "openapi: 3.0.0\ninfo:\n  title: Pet Store\n  version: 1.2.0\npaths:\n  /pets:\n    get:\n      summary: List pets\n";

    struct StaticLoader(&'static str);

    #[async_trait]
    impl DefinitionLoader for StaticLoader {
        async fn load(&self, source: &str) -> Result<RawDefinition> {
            Ok(RawDefinition::new(self.0).with_filename(source))
        }
    }

    #[derive(Default)]
    struct RecordingOutput(Mutex<Vec<String>>);

    #[async_trait]
    impl OutputService for RecordingOutput {
        async fn write_project(&self, root: &Path, files: &ProjectFileSet) -> Result<Vec<PathBuf>> {
            let paths: Vec<_> = files.paths().map(str::to_string).collect();
            self.0.lock().unwrap().extend(paths.iter().cloned());
            Ok(paths.iter().map(|p| root.join(p)).collect())
        }
    }

    fn request(server_config: Option<String>) -> GenerateServerRequest {
        GenerateServerRequest {
            source: "pets.yaml".to_string(),
            language: Language::Python,
            name: None,
            authentication: Authentication::None,
            server_config,
            output_dir: PathBuf::from("out"),
            options: GenerateOptions::default(),
        }
    }

    #[test]
    fn test_config_from_report_uses_definition_info() {
        let report = ingest(&RawDefinition::new(PETS).with_filename("pets.yaml")).unwrap();
        let config = config_from_report(&report, None, Language::Go);
        assert_eq!(config.name, "Pet Store");
        assert_eq!(config.version, "1.2.0");
        assert_eq!(config.endpoints.len(), 1);

        let renamed = config_from_report(&report, Some("Renamed"), Language::Go);
        assert_eq!(renamed.name, "Renamed");
    }

    #[test]
    fn test_generate_from_json_merges_config_warnings() {
        let content = r#"{
            "name": "Pets",
            "language": "typescript",
            "endpoints": [
                {"path": "/pets", "method": "GET"},
                {"method": "POST"}
            ]
        }"#;
        let outcome = generate_from_json(content, &GenerateOptions::default()).unwrap();
        assert!(outcome.success);
        assert!(!outcome.warnings.is_empty());
    }

    #[test]
    fn test_generate_from_json_rejects_unknown_language() {
        let content = r#"{"name": "Pets", "language": "cobol", "endpoints": []}"#;
        let err = generate_from_json(content, &GenerateOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(_)));
    }

    #[tokio::test]
    async fn test_use_case_writes_every_generated_file() {
        let output = Arc::new(RecordingOutput::default());
        let use_case = GenerateServerUseCase::new(Arc::new(StaticLoader(PETS)), output.clone());
        let response = use_case.execute(request(None)).await.unwrap();

        assert_eq!(response.endpoints, 1);
        assert_eq!(response.files.len(), output.0.lock().unwrap().len());
        assert!(response.files.contains(&PathBuf::from("out/main.py")));
    }

    #[tokio::test]
    async fn test_server_config_without_endpoints_takes_the_definition() {
        let config = r#"{"name": "Custom", "language": "go", "authentication": {"type": "Bearer Token"}}"#;
        let use_case = GenerateServerUseCase::new(
            Arc::new(StaticLoader(PETS)),
            Arc::new(RecordingOutput::default()),
        );
        let response = use_case.execute(request(Some(config.to_string()))).await.unwrap();
        assert!(response.files.contains(&PathBuf::from("out/auth.go")));
        assert_eq!(response.endpoints, 1);
    }
}
