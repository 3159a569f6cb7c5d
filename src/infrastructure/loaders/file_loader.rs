//! File-based definition loader
//!
//! Only reads the file; detection and parsing happen in the core.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::application::DefinitionLoader;
use crate::core::{Error, Result};
use crate::definition::RawDefinition;

/// Loads definitions from local files
#[derive(Debug, Default)]
pub struct FileDefinitionLoader;

impl FileDefinitionLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DefinitionLoader for FileDefinitionLoader {
    async fn load(&self, source: &str) -> Result<RawDefinition> {
        let path = Path::new(source);
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::load(format!("{source}: {e}")))?;
        debug!(path = %path.display(), bytes = content.len(), "Read definition file");

        let raw = RawDefinition::new(content);
        Ok(match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => raw.with_filename(name),
            None => raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_loads_content_and_filename() {
        let mut file = NamedTempFile::with_suffix(".yaml").expect("Failed to create temp file");
        file.write_all(b"openapi: 3.0.0\npaths: {}\n").expect("Failed to write temp file");

        let raw = FileDefinitionLoader::new()
            .load(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert!(raw.content.starts_with("openapi"));
        assert!(raw.filename.unwrap().ends_with(".yaml"));
    }

    #[tokio::test]
    async fn test_missing_file_is_a_load_error() {
        let err = FileDefinitionLoader::new()
            .load("/definitely/not/here.json")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Load(ref msg) if msg.contains("not/here.json")));
    }
}
