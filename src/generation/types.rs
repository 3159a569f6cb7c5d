//! Core types for the generation domain

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::Diagnostic;
use crate::generation::GenerationError;

/// Target languages of generated servers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "ts")]
    TypeScript,
    #[serde(alias = "py")]
    Python,
    #[serde(alias = "golang")]
    Go,
    #[serde(alias = "rs")]
    Rust,
}

impl Language {
    /// Get the display name for this language
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::TypeScript => "TypeScript",
            Language::Python => "Python",
            Language::Go => "Go",
            Language::Rust => "Rust",
        }
    }

    /// Get the source file extension for this language
    pub fn file_extension(&self) -> &'static str {
        match self {
            Language::TypeScript => "ts",
            Language::Python => "py",
            Language::Go => "go",
            Language::Rust => "rs",
        }
    }

    /// HTTP framework the generated server is built on
    pub fn framework(&self) -> &'static str {
        match self {
            Language::TypeScript => "express",
            Language::Python => "fastapi",
            Language::Go => "net/http",
            Language::Rust => "axum",
        }
    }

    /// Get all supported languages
    pub fn all() -> &'static [Language] {
        &[
            Language::TypeScript,
            Language::Python,
            Language::Go,
            Language::Rust,
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::TypeScript => write!(f, "typescript"),
            Language::Python => write!(f, "python"),
            Language::Go => write!(f, "go"),
            Language::Rust => write!(f, "rust"),
        }
    }
}

impl FromStr for Language {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "typescript" | "ts" | "node" | "nodejs" => Ok(Language::TypeScript),
            "python" | "py" => Ok(Language::Python),
            "go" | "golang" => Ok(Language::Go),
            "rust" | "rs" => Ok(Language::Rust),
            _ => Err(GenerationError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Role of a generated file in the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Code,
    Config,
    Documentation,
}

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerFile {
    /// File name without directories
    pub name: String,
    /// Path relative to the project root, `/`-separated
    pub path: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl ServerFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>, kind: FileKind) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Self {
            name,
            path,
            content: content.into(),
            kind,
            language: None,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

/// Complete output of one generation run: ordered, no two files share a path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectFileSet {
    files: Vec<ServerFile>,
}

impl ProjectFileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file, rejecting a path that is already present
    pub fn push(&mut self, file: ServerFile) -> Result<(), GenerationError> {
        if file.path.is_empty() || file.path.starts_with('/') || file.path.contains("..") {
            return Err(GenerationError::RenderError(format!(
                "invalid output path `{}`",
                file.path
            )));
        }
        if self.get(&file.path).is_some() {
            return Err(GenerationError::DuplicatePath(file.path));
        }
        self.files.push(file);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&ServerFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServerFile> {
        self.files.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl IntoIterator for ProjectFileSet {
    type Item = ServerFile;
    type IntoIter = std::vec::IntoIter<ServerFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

/// Result envelope of a generation call. On failure `files` is absent: no
/// partial file set is ever returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<ProjectFileSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<Diagnostic>,
}

impl GenerationOutcome {
    pub fn succeeded(files: ProjectFileSet, warnings: Vec<Diagnostic>) -> Self {
        Self {
            success: true,
            files: Some(files),
            error: None,
            warnings,
        }
    }

    pub fn failed(error: impl fmt::Display, warnings: Vec<Diagnostic>) -> Self {
        Self {
            success: false,
            files: None,
            error: Some(error.to_string()),
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_language_from_str() {
        assert_eq!(Language::from_str("rust").unwrap(), Language::Rust);
        assert_eq!(Language::from_str("python").unwrap(), Language::Python);
        assert_eq!(Language::from_str("typescript").unwrap(), Language::TypeScript);
        assert_eq!(Language::from_str("go").unwrap(), Language::Go);

        // Aliases
        assert_eq!(Language::from_str("py").unwrap(), Language::Python);
        assert_eq!(Language::from_str("ts").unwrap(), Language::TypeScript);
        assert_eq!(Language::from_str("golang").unwrap(), Language::Go);

        // Case insensitivity
        assert_eq!(Language::from_str("RUST").unwrap(), Language::Rust);
        assert_eq!(Language::from_str("TypeScript").unwrap(), Language::TypeScript);

        // Invalid input
        let err = Language::from_str("cobol").unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedLanguage(ref l) if l == "cobol"));
        assert!(Language::from_str("").is_err());
    }

    #[test]
    fn test_language_display_round_trips_through_serde() {
        for language in Language::all() {
            let json = serde_json::to_value(language).unwrap();
            assert_eq!(json, serde_json::json!(language.to_string()));
        }
        assert_eq!(
            serde_json::from_value::<Language>(serde_json::json!("ts")).unwrap(),
            Language::TypeScript
        );
    }

    #[test]
    fn test_language_properties() {
        assert_eq!(Language::Python.display_name(), "Python");
        assert_eq!(Language::Go.file_extension(), "go");
        assert_eq!(Language::Rust.framework(), "axum");
        assert_eq!(Language::all().len(), 4);
    }

    #[test]
    fn test_server_file_name_from_path() {
        let file = ServerFile::new("src/handlers/get_pets.ts", "", FileKind::Code);
        assert_eq!(file.name, "get_pets.ts");
        let root = ServerFile::new("README.md", "", FileKind::Documentation);
        assert_eq!(root.name, "README.md");
    }

    #[test]
    fn test_file_set_rejects_duplicate_paths() {
        let mut files = ProjectFileSet::new();
        files
            .push(ServerFile::new("package.json", "{}", FileKind::Config))
            .unwrap();
        let err = files
            .push(ServerFile::new("package.json", "{}", FileKind::Config))
            .unwrap_err();
        assert!(matches!(err, GenerationError::DuplicatePath(_)));
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_file_set_rejects_escaping_paths() {
        let mut files = ProjectFileSet::new();
        assert!(files.push(ServerFile::new("../x", "", FileKind::Code)).is_err());
        assert!(files.push(ServerFile::new("/etc/x", "", FileKind::Code)).is_err());
    }

    #[test]
    fn test_failed_outcome_has_no_files() {
        let outcome = GenerationOutcome::failed("boom", Vec::new());
        assert!(!outcome.success);
        assert!(outcome.files.is_none());
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("files").is_none());
        assert_eq!(json["error"], "boom");
    }
}
