//! Infrastructure layer: concrete implementations of the application ports

pub mod loaders;
pub mod output;

pub use loaders::{CompositeDefinitionLoader, FileDefinitionLoader, HttpDefinitionLoader};
pub use output::FileSystemOutputService;
