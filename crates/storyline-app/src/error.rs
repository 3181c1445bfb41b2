//! Application-level error type shared by the binary and services.

use std::path::PathBuf;

use thiserror::Error;

use crate::config;
use crate::paths::PathError;
use crate::pipeline::ProcessorError;
use crate::services::{PipelineError, ServiceError};
use crate::state::StateError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    ConfigLoad(#[from] config::AppConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Paths(#[from] PathError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("failed to read input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read standard input: {0}")]
    Stdin(#[source] std::io::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),
}
