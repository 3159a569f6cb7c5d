//! Naming rules for generated projects

use crate::generation::GenerationError;
use crate::generation::utils::to_kebab_case;

const FALLBACK_PACKAGE_NAME: &str = "mcp-server";

/// Package name derived from a display name: lower-case ASCII words joined by
/// dashes, never starting with a digit
pub fn package_name(display_name: &str) -> String {
    let ascii: String = display_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let kebab = to_kebab_case(&ascii);
    match kebab.chars().next() {
        None => FALLBACK_PACKAGE_NAME.to_string(),
        Some(c) if c.is_ascii_digit() => format!("mcp-{kebab}"),
        Some(_) => kebab,
    }
}

/// Validates a package name produced by [`package_name`] or supplied by a caller
pub fn validate_package_name(name: &str) -> Result<(), GenerationError> {
    if name.is_empty() {
        return Err(GenerationError::ValidationError(
            "Package name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(GenerationError::ValidationError(format!(
            "Package name `{name}` must contain only lower-case letters, digits, and dashes"
        )));
    }

    if name.starts_with('-') || name.ends_with('-') || name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(GenerationError::ValidationError(format!(
            "Package name `{name}` must start with a letter and not end with a dash"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name() {
        assert_eq!(package_name("Pet Store"), "pet-store");
        assert_eq!(package_name("petStore API v2"), "pet-store-api-v2");
        assert_eq!(package_name("Café ☕"), "caf");
        assert_eq!(package_name("!!!"), "mcp-server");
        assert_eq!(package_name("3D Printer"), "mcp-3d-printer");
    }

    #[test]
    fn test_validate_package_name() {
        assert!(validate_package_name("my-project").is_ok());
        assert!(validate_package_name("project123").is_ok());

        assert!(validate_package_name("").is_err());
        assert!(validate_package_name("-project").is_err());
        assert!(validate_package_name("project-").is_err());
        assert!(validate_package_name("my_project").is_err());
        assert!(validate_package_name("My-Project").is_err());
        assert!(validate_package_name("9lives").is_err());
    }

    #[test]
    fn test_derived_names_are_valid() {
        for name in ["Pet Store", "!!!", "3D Printer", "  spaced  out  "] {
            assert!(validate_package_name(&package_name(name)).is_ok(), "{name}");
        }
    }
}
