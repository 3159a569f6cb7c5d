//! Application layer: the use cases every driver calls

pub mod generate_server;
pub mod ingest;
pub mod traits;

pub use generate_server::{
    GenerateServerRequest, GenerateServerResponse, GenerateServerUseCase, config_from_report, generate,
    generate_from_json,
};
pub use ingest::{IngestReport, ingest};
pub use traits::{DefinitionLoader, OutputService};
