//! Composite loader that dispatches on the source type

use async_trait::async_trait;
use tracing::debug;

use super::{FileDefinitionLoader, HttpDefinitionLoader, is_url};
use crate::application::DefinitionLoader;
use crate::core::Result;
use crate::definition::RawDefinition;

/// Sends URLs to the HTTP loader and everything else to the file loader
pub struct CompositeDefinitionLoader {
    http: Box<dyn DefinitionLoader>,
    file: Box<dyn DefinitionLoader>,
}

impl CompositeDefinitionLoader {
    pub fn new() -> Result<Self> {
        Ok(Self::with_loaders(
            Box::new(HttpDefinitionLoader::new()?),
            Box::new(FileDefinitionLoader::new()),
        ))
    }

    pub fn with_loaders(http: Box<dyn DefinitionLoader>, file: Box<dyn DefinitionLoader>) -> Self {
        Self { http, file }
    }
}

#[async_trait]
impl DefinitionLoader for CompositeDefinitionLoader {
    async fn load(&self, source: &str) -> Result<RawDefinition> {
        if is_url(source) {
            debug!(source, "Loading definition over HTTP");
            self.http.load(source).await
        } else {
            debug!(source, "Loading definition from file");
            self.file.load(source).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl DefinitionLoader for Named {
        async fn load(&self, source: &str) -> Result<RawDefinition> {
            Ok(RawDefinition::new(source).with_filename(self.0))
        }
    }

    #[tokio::test]
    async fn test_dispatches_by_source() {
        let loader = CompositeDefinitionLoader::with_loaders(Box::new(Named("http")), Box::new(Named("file")));
        let remote = loader.load("https://example.com/spec.json").await.unwrap();
        assert_eq!(remote.filename.as_deref(), Some("http"));
        let local = loader.load("spec.json").await.unwrap();
        assert_eq!(local.filename.as_deref(), Some("file"));
    }
}
