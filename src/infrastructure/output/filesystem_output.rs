//! Filesystem-based output service implementation

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::application::OutputService;
use crate::core::{Error, Result};
use crate::generation::ProjectFileSet;

/// Output service that writes a project below a root directory
#[derive(Debug, Default)]
pub struct FileSystemOutputService;

impl FileSystemOutputService {
    pub fn new() -> Self {
        Self
    }
}

/// Resolve a project-relative path, refusing anything that escapes `root`
fn resolve(root: &Path, relative: &str) -> Result<PathBuf> {
    let relative = Path::new(relative);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if relative.as_os_str().is_empty() || escapes {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("refusing to write outside the output directory: {}", relative.display()),
        )));
    }
    Ok(root.join(relative))
}

fn io_context(action: &str, path: &Path, err: std::io::Error) -> Error {
    Error::Io(std::io::Error::new(
        err.kind(),
        format!("Failed to {action} {}: {err}", path.display()),
    ))
}

#[async_trait]
impl OutputService for FileSystemOutputService {
    async fn write_project(&self, root: &Path, files: &ProjectFileSet) -> Result<Vec<PathBuf>> {
        // resolve everything first so a bad path writes nothing
        let targets = files
            .iter()
            .map(|file| resolve(root, &file.path).map(|target| (target, file)))
            .collect::<Result<Vec<_>>>()?;

        let mut written = Vec::with_capacity(targets.len());
        for (target, file) in targets {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_context("create directory", parent, e))?;
            }

            let mut handle = fs::File::create(&target)
                .await
                .map_err(|e| io_context("create file", &target, e))?;
            handle
                .write_all(file.content.as_bytes())
                .await
                .map_err(|e| io_context("write file", &target, e))?;
            handle
                .flush()
                .await
                .map_err(|e| io_context("flush file", &target, e))?;

            debug!(path = %target.display(), bytes = file.content.len(), "Wrote file");
            written.push(target);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{FileKind, ServerFile};
    use tempfile::TempDir;

    fn project(paths: &[&str]) -> ProjectFileSet {
        let mut files = ProjectFileSet::new();
        for path in paths {
            files
                .push(ServerFile::new(*path, format!("content of {path}"), FileKind::Code))
                .unwrap();
        }
        files
    }

    #[tokio::test]
    async fn test_writes_nested_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let written = FileSystemOutputService::new()
            .write_project(temp_dir.path(), &project(&["src/handlers/get_pets.ts", "package.json"]))
            .await
            .unwrap();

        assert_eq!(written.len(), 2);
        let content = std::fs::read_to_string(temp_dir.path().join("src/handlers/get_pets.ts"))
            .expect("Failed to read handler");
        assert_eq!(content, "content of src/handlers/get_pets.ts");
    }

    #[tokio::test]
    async fn test_refuses_escaping_paths() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join("out");
        let err = FileSystemOutputService::new()
            .write_project(&root, &project(&["ok.txt", "../escape.txt"]))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::InvalidInput));
        assert!(!root.join("ok.txt").exists());
    }
}
