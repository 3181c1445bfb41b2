//! JSON persistence for the content record shared between robots.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::debug;

use crate::paths::{PathError, ensure_parent_dir};
use crate::pipeline::Content;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("state file {path} is not a valid content record: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode content record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error(transparent)]
    Path(#[from] PathError),
}

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the record; a missing file yields an empty record.
    pub async fn load(&self) -> Result<Content, StateError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet; starting fresh");
                return Ok(Content::default());
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_slice(&bytes).map_err(|source| StateError::Decode {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the record through a temporary sibling file and renames it into
    /// place.
    pub async fn save(&self, content: &Content) -> Result<(), StateError> {
        ensure_parent_dir(&self.path)?;
        let encoded = serde_json::to_vec_pretty(content).map_err(StateError::Encode)?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, &encoded)
            .await
            .map_err(|source| StateError::Write {
                path: tmp_path.clone(),
                source,
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StateError::Write {
                path: self.path.clone(),
                source,
            })?;

        debug!(
            path = %self.path.display(),
            bytes = encoded.len(),
            sentences = content.sentences.len(),
            "saved content record"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
