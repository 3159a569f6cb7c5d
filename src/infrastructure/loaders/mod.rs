//! Definition loaders: local files, HTTP(S) URLs, and a composite that picks
//! between them by the shape of the source.

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;

pub use composite_loader::CompositeDefinitionLoader;
pub use file_loader::FileDefinitionLoader;
pub use http_loader::HttpDefinitionLoader;

/// Whether `source` names an HTTP(S) URL rather than a file path
pub fn is_url(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
