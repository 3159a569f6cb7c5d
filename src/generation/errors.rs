//! Error types for the generation domain

use thiserror::Error;

use crate::core::Error;

/// Errors that can occur during code generation
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Template error: {0}")]
    TemplateError(String),

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("Duplicate output path: {0}")]
    DuplicatePath(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<GenerationError> for Error {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::UnsupportedLanguage(language) => Error::UnsupportedLanguage(language),
            other => Error::GenerationFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_language_keeps_its_kind() {
        let err: Error = GenerationError::UnsupportedLanguage("cobol".to_string()).into();
        assert!(matches!(err, Error::UnsupportedLanguage(ref l) if l == "cobol"));
    }

    #[test]
    fn test_other_errors_become_generation_failures() {
        let err: Error = GenerationError::RenderError("missing variable".to_string()).into();
        assert!(matches!(err, Error::GenerationFailure(_)));
        assert_eq!(
            err.to_string(),
            "Generation failed: Render error: missing variable"
        );
    }
}
