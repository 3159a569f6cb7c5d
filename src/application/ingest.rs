//! Use case: raw definition to canonical endpoints

use serde::Serialize;
use tracing::{debug, info};

use crate::core::{Diagnostic, Diagnostics, Error, Result};
use crate::definition::{DefinitionFormat, DefinitionInfo, RawDefinition, detect_with_reason, parse};
use crate::endpoints::{Endpoint, normalize};

/// Everything learned from one definition document
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub format: DefinitionFormat,
    pub info: DefinitionInfo,
    pub endpoints: Vec<Endpoint>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Detect, parse and normalize a definition.
///
/// Detection and parse failures stop here; everything after that is
/// reported through `diagnostics` in the returned report.
pub fn ingest(raw: &RawDefinition) -> Result<IngestReport> {
    let detection = detect_with_reason(&raw.content, raw.filename.as_deref());
    debug!(format = %detection.format, reason = %detection.reason, "Detected definition format");
    if detection.format == DefinitionFormat::Unknown {
        return Err(Error::detection(detection.reason));
    }

    let mut diagnostics = Diagnostics::new();
    let tree = parse(&raw.content, detection.format, &mut diagnostics)?;
    let endpoints = normalize(&tree, &mut diagnostics);
    info!(
        format = %detection.format,
        endpoints = endpoints.len(),
        warnings = diagnostics.warnings().count(),
        "Ingested definition"
    );

    Ok(IngestReport {
        format: detection.format,
        info: tree.info(),
        endpoints,
        diagnostics: diagnostics.into_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::McpType;

    const PETS: &str = r#"{
        "openapi": "3.0.0",
        "info": {"title": "Pets", "version": "2.1.0"},
        "servers": [{"url": "https://pets.example.com/v1"}],
        "paths": {
            "/pets": {
                "get": {"operationId": "listPets"},
                "post": {"operationId": "createPet"}
            }
        }
    }"#;

    #[test]
    fn test_ingest_json_definition() {
        let report = ingest(&RawDefinition::new(PETS)).unwrap();
        assert_eq!(report.format, DefinitionFormat::Json);
        assert_eq!(report.info.title.as_deref(), Some("Pets"));
        assert_eq!(report.info.base_url.as_deref(), Some("https://pets.example.com/v1"));
        let kinds: Vec<_> = report.endpoints.iter().map(|e| e.mcp_type).collect();
        assert_eq!(kinds, vec![McpType::Resource, McpType::Tool]);
    }

    #[test]
    fn test_unknown_format_is_a_detection_failure() {
        let err = ingest(&RawDefinition::new("not valid: : :anything")).unwrap_err();
        assert!(matches!(err, Error::DetectionFailure { .. }));
    }

    #[test]
    fn test_filename_hint_forces_the_parser() {
        let raw = RawDefinition::new("{ broken").with_filename("api.json");
        assert!(matches!(ingest(&raw), Err(Error::ParseFailure { .. })));
    }
}
