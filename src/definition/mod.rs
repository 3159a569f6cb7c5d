//! Definition intake: format detection and parsing of uploaded API
//! definitions (OpenAPI 2/3 in JSON or YAML, RAML, API Blueprint).

pub mod blueprint;
pub mod detector;
pub mod format;
pub mod parser;
pub mod raml;
mod yaml;

pub use blueprint::{BlueprintAction, BlueprintDocument, BlueprintParameter, BlueprintResponse};
pub use detector::{Detection, detect, detect_with_reason};
pub use format::{DefinitionFormat, RawDefinition};
pub use parser::{DefinitionInfo, ParsedTree, parse};
pub use raml::{RamlDocument, RamlMethod, RamlParameter, RamlResource, RamlResponse};
