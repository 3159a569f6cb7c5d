//! mcp-forge CLI entrypoint
//! Parses command-line arguments and dispatches to the library use cases.
#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mcp_forge::application::{DefinitionLoader, GenerateServerRequest, GenerateServerUseCase, ingest};
use mcp_forge::core::ForgeConfig;
use mcp_forge::generation::{GenerateOptions, Language};
use mcp_forge::infrastructure::{CompositeDefinitionLoader, FileSystemOutputService};
use mcp_forge::server::{Authentication, KeyLocation};
use mcp_forge::validator::{ConformanceValidator, ValidatorOptions};

#[derive(Parser)]
#[command(name = "mcp-forge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML); defaults to $MCP_FORGE_CONFIG or the user config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a definition and print its endpoints and diagnostics as JSON
    Inspect {
        /// File path or HTTP(S) URL of the API definition
        source: String,
    },
    /// Generate an MCP server project from an API definition
    Generate {
        /// File path or HTTP(S) URL of the API definition
        source: String,
        /// Target language (typescript, python, go, rust)
        #[arg(long, short)]
        language: Option<Language>,
        /// Server name; defaults to the definition title
        #[arg(long)]
        name: Option<String>,
        /// Authentication enforced on /mcp routes
        #[arg(long, value_enum, default_value_t = AuthKind::None)]
        auth: AuthKind,
        /// Where clients send the API key
        #[arg(long, value_enum, default_value_t = KeyLocationArg::Header)]
        key_location: KeyLocationArg,
        /// Header, query parameter or cookie carrying the API key
        #[arg(long)]
        key_name: Option<String>,
        /// Expected credential, written to .env.example
        #[arg(long)]
        secret: Option<String>,
        /// Server configuration JSON file overriding the flags above
        #[arg(long)]
        server_config: Option<PathBuf>,
        /// Output directory; defaults to <generation.output_dir>/<package name>
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Run the conformance checks against a running MCP server
    Validate {
        /// Base URL of the server
        url: String,
        /// API key sent with every request
        #[arg(long)]
        api_key: Option<String>,
        /// Header carrying the API key
        #[arg(long)]
        api_key_header: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AuthKind {
    None,
    ApiKey,
    Bearer,
    Basic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KeyLocationArg {
    Header,
    Query,
    Cookie,
}

impl From<KeyLocationArg> for KeyLocation {
    fn from(location: KeyLocationArg) -> Self {
        match location {
            KeyLocationArg::Header => KeyLocation::Header,
            KeyLocationArg::Query => KeyLocation::Query,
            KeyLocationArg::Cookie => KeyLocation::Cookie,
        }
    }
}

fn authentication(
    kind: AuthKind,
    location: KeyLocationArg,
    key_name: Option<String>,
    secret: Option<String>,
) -> Authentication {
    match kind {
        AuthKind::None => Authentication::None,
        AuthKind::ApiKey => Authentication::ApiKey {
            location: location.into(),
            name: key_name,
            value: secret,
        },
        AuthKind::Bearer => Authentication::BearerToken { value: secret },
        AuthKind::Basic => Authentication::BasicAuth { value: secret },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ForgeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Inspect { source } => inspect(&source).await,
        Commands::Generate {
            source,
            language,
            name,
            auth,
            key_location,
            key_name,
            secret,
            server_config,
            output_dir,
        } => {
            let server_config = match server_config {
                Some(path) => Some(
                    tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read server config {}", path.display()))?,
                ),
                None => None,
            };
            let language = language.unwrap_or(config.generation.default_language);
            let output_dir = output_dir.unwrap_or_else(|| {
                let project = name.as_deref().map(mcp_forge::generation::rules::package_name);
                config
                    .generation
                    .output_dir
                    .join(project.unwrap_or_else(|| language.to_string()))
            });
            let options = if config.generation.stamp_metadata {
                GenerateOptions::stamped_now()
            } else {
                GenerateOptions::default()
            };

            let request = GenerateServerRequest {
                source,
                language,
                name,
                authentication: authentication(auth, key_location, key_name, secret),
                server_config,
                output_dir,
                options,
            };
            generate(request).await
        }
        Commands::Validate {
            url,
            api_key,
            api_key_header,
            timeout,
        } => {
            let mut options = ValidatorOptions::from(&config.validator);
            if let Some(header) = api_key_header {
                options.api_key_header = header;
            }
            if let Some(secs) = timeout {
                options.timeout = Duration::from_secs(secs);
            }
            validate(&url, api_key.as_deref(), options).await
        }
    }
}

async fn inspect(source: &str) -> anyhow::Result<()> {
    let loader = CompositeDefinitionLoader::new()?;
    let raw = loader
        .load(source)
        .await
        .with_context(|| format!("Failed to load {source}"))?;
    let report = ingest(&raw).with_context(|| format!("Failed to ingest {source}"))?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn generate(request: GenerateServerRequest) -> anyhow::Result<()> {
    let source = request.source.clone();
    let use_case = GenerateServerUseCase::new(
        Arc::new(CompositeDefinitionLoader::new()?),
        Arc::new(FileSystemOutputService::new()),
    );
    let response = use_case
        .execute(request)
        .await
        .with_context(|| format!("Failed to generate a server from {source}"))?;

    for diagnostic in &response.diagnostics {
        eprintln!("{diagnostic}");
    }
    info!(
        output_dir = %response.output_dir.display(),
        files = response.files.len(),
        routes = response.endpoints,
        "Generation complete"
    );
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn validate(url: &str, api_key: Option<&str>, options: ValidatorOptions) -> anyhow::Result<()> {
    let validator = ConformanceValidator::new(options)?;
    let report = validator.validate(url, api_key).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.passed {
        let failed: Vec<_> = report.failures().map(|c| c.check.as_str()).collect();
        bail!("{url} failed conformance checks: {}", failed.join(", "));
    }
    Ok(())
}
