//! Cross-cutting pieces shared by every stage: errors, diagnostics and tool
//! configuration.

pub mod config;
pub mod diagnostics;
pub mod error;

pub use config::ForgeConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity, Stage};
pub use error::{Error, Result};
