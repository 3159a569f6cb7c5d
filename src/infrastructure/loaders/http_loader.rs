//! HTTP-based definition loader

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::application::DefinitionLoader;
use crate::core::{Error, Result};
use crate::definition::{DefinitionFormat, RawDefinition};

/// Loads definitions from HTTP/HTTPS URLs
pub struct HttpDefinitionLoader {
    client: Client,
}

impl HttpDefinitionLoader {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::load(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

/// File name hint for detection: the URL's last path segment when it has a
/// known extension, otherwise one derived from the content type
fn filename_hint(url: &Url, content_type: &str) -> Option<String> {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty());
    if let Some(segment) = segment {
        let known = segment
            .rsplit_once('.')
            .and_then(|(_, ext)| DefinitionFormat::from_extension(ext))
            .is_some();
        if known {
            return Some(segment.to_string());
        }
    }

    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("json") {
        Some("definition.json".to_string())
    } else if content_type.contains("yaml") {
        Some("definition.yaml".to_string())
    } else if content_type.contains("raml") {
        Some("definition.raml".to_string())
    } else if content_type.contains("markdown") || content_type.contains("apiblueprint") {
        Some("definition.md".to_string())
    } else {
        None
    }
}

#[async_trait]
impl DefinitionLoader for HttpDefinitionLoader {
    async fn load(&self, source: &str) -> Result<RawDefinition> {
        let url = Url::parse(source).map_err(|e| Error::load(format!("Invalid URL {source}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::load(format!(
                "HttpDefinitionLoader only handles HTTP(S) URLs, got: {source}"
            )));
        }

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::load(format!("Failed to fetch {source}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::load(format!("HTTP {status} when fetching {source}")));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let content = response
            .text()
            .await
            .map_err(|e| Error::load(format!("Failed to read response body: {e}")))?;
        debug!(%url, %content_type, bytes = content.len(), "Fetched definition");

        let raw = RawDefinition::new(content);
        Ok(match filename_hint(&url, &content_type) {
            Some(name) => raw.with_filename(name),
            None => raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_filename_hint() {
        let url = Url::parse("https://example.com/specs/pets.yml").unwrap();
        assert_eq!(filename_hint(&url, "text/plain").as_deref(), Some("pets.yml"));

        let url = Url::parse("https://example.com/api-docs").unwrap();
        assert_eq!(
            filename_hint(&url, "application/json; charset=utf-8").as_deref(),
            Some("definition.json")
        );
        assert_eq!(filename_hint(&url, "text/plain"), None);
    }

    #[tokio::test]
    async fn test_fetches_definition() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"openapi": "3.0.0", "paths": {}}"#)
                    .insert_header("content-type", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let loader = HttpDefinitionLoader::new().unwrap();
        let raw = loader.load(&format!("{}/openapi", mock_server.uri())).await.unwrap();
        assert!(raw.content.contains("openapi"));
        assert_eq!(raw.filename.as_deref(), Some("definition.json"));
    }

    #[tokio::test]
    async fn test_error_status_is_a_load_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let loader = HttpDefinitionLoader::new().unwrap();
        let err = loader
            .load(&format!("{}/missing.json", mock_server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Load(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls() {
        let loader = HttpDefinitionLoader::new().unwrap();
        assert!(loader.load("file:///etc/hosts").await.is_err());
    }
}
