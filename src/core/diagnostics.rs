//! Non-fatal findings collected while a definition moves through the pipeline.
//!
//! Each stage receives a `&mut Diagnostics` instead of logging through a global
//! sink, so callers can show warnings next to the result they belong to. Every
//! recorded diagnostic is also emitted as a `tracing` event.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Pipeline stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Detection,
    Parsing,
    Normalization,
    Configuration,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Detection => "detection",
            Stage::Parsing => "parsing",
            Stage::Normalization => "normalization",
            Stage::Configuration => "configuration",
            Stage::Generation => "generation",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// A single non-fatal finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    /// Location the finding refers to, e.g. `GET /pets` or `paths./pets`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subject {
            Some(subject) => write!(f, "[{}] {}: {}", self.stage, subject, self.message),
            None => write!(f, "[{}] {}", self.stage, self.message),
        }
    }
}

/// Ordered collector of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(Severity::Warning, stage, message.into(), None);
    }

    /// Record a warning attached to a specific location in the input
    pub fn warn_at(&mut self, stage: Stage, subject: impl Into<String>, message: impl Into<String>) {
        self.record(Severity::Warning, stage, message.into(), Some(subject.into()));
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        self.record(Severity::Info, stage, message.into(), None);
    }

    pub fn info_at(&mut self, stage: Stage, subject: impl Into<String>, message: impl Into<String>) {
        self.record(Severity::Info, stage, message.into(), Some(subject.into()));
    }

    fn record(&mut self, severity: Severity, stage: Stage, message: String, subject: Option<String>) {
        match severity {
            Severity::Warning => warn!(%stage, subject = subject.as_deref(), "{message}"),
            Severity::Info => info!(%stage, subject = subject.as_deref(), "{message}"),
        }
        self.entries.push(Diagnostic {
            severity,
            stage,
            message,
            subject,
        });
    }

    /// Append every entry of `other`, keeping order
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
