use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{AppConfig, AppConfigError};
use crate::pipeline::{ProcessorError, TextProcessor, TextProcessorOptions};
use crate::services::http::{HttpOptions, ServiceError};
use crate::services::keywords::WatsonKeywordClient;
use crate::services::robot::TextRobot;
use crate::services::wikipedia::WikipediaClient;
use crate::state::{StateError, StateStore};
use crate::text::TruncationPolicy;

/// Source of raw article text keyed by a search term.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_content(&self, search_term: &str) -> Result<String, ServiceError>;
}

/// Produces an ordered keyword list for one sentence.
#[async_trait]
pub trait KeywordExtractor: Send + Sync {
    async fn extract_keywords(&self, sentence: &str) -> Result<Vec<String>, ServiceError>;
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no search term given and none stored in the state file")]
    MissingSearchTerm,
    #[error(transparent)]
    Config(#[from] AppConfigError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("failed to fetch content for `{search_term}`: {source}")]
    ContentFetch {
        search_term: String,
        #[source]
        source: ServiceError,
    },
    #[error("failed to extract keywords for sentence {index}: {source}")]
    Keywords {
        index: usize,
        #[source]
        source: ServiceError,
    },
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    State(#[from] StateError),
}

/// Per-invocation overrides layered on top of [`AppConfig`].
#[derive(Debug, Clone, Default)]
pub struct RobotOverrides {
    pub max_sentences: Option<usize>,
    pub strict: bool,
    pub state_path: Option<PathBuf>,
    pub skip_keywords: bool,
}

pub fn processor_options(config: &AppConfig, overrides: &RobotOverrides) -> TextProcessorOptions {
    let mut options = config.text.processor_options();
    if let Some(max) = overrides.max_sentences {
        options.max_sentences = max;
    }
    if overrides.strict {
        options.truncation = TruncationPolicy::Strict;
    }
    options
}

/// Wires the production collaborators from configuration.
pub fn build_text_robot(config: &AppConfig, overrides: &RobotOverrides) -> PipelineResult<TextRobot> {
    let processor = TextProcessor::new(processor_options(config, overrides))?;
    let http = HttpOptions::from(&config.http);

    let source: Arc<dyn ContentSource> =
        Arc::new(WikipediaClient::from_config(&config.wikipedia, &http)?);
    let keywords: Option<Arc<dyn KeywordExtractor>> = if overrides.skip_keywords {
        None
    } else {
        Some(Arc::new(WatsonKeywordClient::from_config(
            &config.keywords,
            &http,
        )?))
    };

    let state_path = match &overrides.state_path {
        Some(path) => path.clone(),
        None => config.state.resolve_path()?,
    };

    Ok(TextRobot::new(
        processor,
        source,
        keywords,
        StateStore::new(state_path),
    ))
}
