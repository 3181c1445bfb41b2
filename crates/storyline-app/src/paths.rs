//! Filesystem path helpers for the persisted content record.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("path {path} has no parent directory")]
    MissingParent { path: PathBuf },
}

/// Creates `path` and its ancestors if needed.
pub fn ensure_dir(path: &Path) -> Result<PathBuf, PathError> {
    if let Err(err) = fs::create_dir_all(path) {
        if err.kind() != io::ErrorKind::AlreadyExists {
            return Err(PathError::CreateDir {
                path: path.to_path_buf(),
                source: err,
            });
        }
    }
    Ok(path.to_path_buf())
}

/// Ensures the directory holding `file` exists. A bare file name resolves to
/// the current directory.
pub fn ensure_parent_dir(file: &Path) -> Result<PathBuf, PathError> {
    match file.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(PathBuf::from(".")),
        Some(parent) => ensure_dir(parent),
        None => Err(PathError::MissingParent {
            path: file.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_nested_parent_directories() {
        let temp = TempDir::new().expect("temp dir");
        let file = temp.path().join("a").join("b").join("content.json");
        let parent = ensure_parent_dir(&file).expect("create parents");
        assert!(parent.is_dir());
        assert_eq!(parent, temp.path().join("a").join("b"));
    }

    #[test]
    fn bare_file_name_uses_current_directory() {
        let parent = ensure_parent_dir(Path::new("content.json")).expect("bare name");
        assert_eq!(parent, PathBuf::from("."));
    }

    #[test]
    fn root_has_no_parent() {
        assert!(matches!(
            ensure_parent_dir(Path::new("/")),
            Err(PathError::MissingParent { .. })
        ));
    }
}
