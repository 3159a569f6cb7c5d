//! Port interfaces for the application layer

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::core::Result;
use crate::definition::RawDefinition;
use crate::generation::ProjectFileSet;

/// Fetches a definition document from wherever `source` points
#[async_trait]
pub trait DefinitionLoader: Send + Sync {
    async fn load(&self, source: &str) -> Result<RawDefinition>;
}

/// Writes a generated project to its destination
#[async_trait]
pub trait OutputService: Send + Sync {
    /// Write every file below `root`, returning the written paths in order
    async fn write_project(&self, root: &Path, files: &ProjectFileSet) -> Result<Vec<PathBuf>>;
}
