//! Configuration loading and XDG path helpers.
//!
//! Sources are layered from lowest to highest precedence: built-in defaults,
//! `/etc/storyline/settings.toml`, `$XDG_CONFIG_HOME/storyline/settings.toml`,
//! `./config/settings.toml`, the file named by `STORYLINE_CONFIG_FILE`, and
//! finally `STORYLINE__SECTION__KEY` environment variables.

use std::env;
use std::path::PathBuf;

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::constants::{
    DEFAULT_KEYWORDS_API_VERSION, DEFAULT_KEYWORDS_SERVICE_URL, DEFAULT_MAXIMUM_SENTENCES,
    DEFAULT_WIKIPEDIA_ENDPOINT, STATE_FILE_NAME,
};
use crate::pipeline::TextProcessorOptions;
use crate::text::{CleanupOptions, SegmenterOptions, TruncationPolicy, WhitespaceCollapse};

const CONFIG_FILE: &str = "config/settings";
const SETTINGS_FILE_NAME: &str = "settings.toml";
const ENV_PREFIX: &str = "STORYLINE";
const ENV_CONFIG_FILE: &str = "STORYLINE_CONFIG_FILE";
const ENV_ETC_CONFIG_DIR: &str = "STORYLINE_ETC_CONFIG_DIR";
const DEFAULT_ETC_CONFIG_DIR: &str = "/etc";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("unable to resolve project directories")]
    MissingProjectDirs,
    #[error(transparent)]
    Build(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub text: TextConfig,
    pub wikipedia: WikipediaConfig,
    pub keywords: KeywordsConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TextConfig {
    pub max_sentences: usize,
    pub whitespace_collapse: WhitespaceCollapse,
    pub truncation: TruncationPolicy,
    #[serde(default)]
    pub extra_abbreviations: Vec<String>,
}

impl TextConfig {
    pub fn processor_options(&self) -> TextProcessorOptions {
        TextProcessorOptions {
            cleanup: CleanupOptions::new(self.whitespace_collapse),
            segmenter: SegmenterOptions {
                extra_abbreviations: self.extra_abbreviations.clone(),
            },
            max_sentences: self.max_sentences,
            truncation: self.truncation,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WikipediaConfig {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KeywordsConfig {
    pub service_url: String,
    pub version: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub requests_per_second: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub max_retries: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StateConfig {
    /// Content record location; `None` means the XDG data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StateConfig {
    /// Only the commands that persist the record need project directories.
    pub fn resolve_path(&self) -> Result<PathBuf, AppConfigError> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => default_state_path(),
        }
    }
}

pub fn load() -> Result<AppConfig, AppConfigError> {
    let mut builder = Config::builder()
        .set_default("text.max_sentences", DEFAULT_MAXIMUM_SENTENCES as u64)?
        .set_default("text.whitespace_collapse", WhitespaceCollapse::default().as_ref())?
        .set_default("text.truncation", TruncationPolicy::default().as_ref())?
        .set_default("text.extra_abbreviations", Vec::<String>::new())?
        .set_default("wikipedia.endpoint", DEFAULT_WIKIPEDIA_ENDPOINT)?
        .set_default("keywords.service_url", DEFAULT_KEYWORDS_SERVICE_URL)?
        .set_default("keywords.version", DEFAULT_KEYWORDS_API_VERSION)?
        .set_default("keywords.requests_per_second", 4_u64)?
        .set_default("http.timeout_secs", 30_u64)?
        .set_default("http.max_retries", 4_u64)?
        .add_source(File::from(etc_config_path()).required(false));

    if let Ok(dirs) = project_dirs() {
        builder =
            builder.add_source(File::from(dirs.config_dir().join(SETTINGS_FILE_NAME)).required(false));
    }

    builder = builder.add_source(File::with_name(CONFIG_FILE).required(false));

    if let Some(override_path) = env::var_os(ENV_CONFIG_FILE) {
        builder = builder.add_source(File::from(PathBuf::from(override_path)).required(false));
    }

    let cfg = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("text.extra_abbreviations"),
        )
        .build()?
        .try_deserialize()?;
    Ok(cfg)
}

pub fn project_dirs() -> Result<ProjectDirs, AppConfigError> {
    ProjectDirs::from("dev", "storyline", "storyline").ok_or(AppConfigError::MissingProjectDirs)
}

fn etc_config_path() -> PathBuf {
    let root = env::var_os(ENV_ETC_CONFIG_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ETC_CONFIG_DIR));
    root.join("storyline").join(SETTINGS_FILE_NAME)
}

fn default_state_path() -> Result<PathBuf, AppConfigError> {
    Ok(project_dirs()?.data_dir().join(STATE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_state_path_skips_project_dirs() {
        let state = StateConfig {
            path: Some(PathBuf::from("/tmp/storyline/content.json")),
        };
        assert_eq!(
            state.resolve_path().expect("explicit path"),
            PathBuf::from("/tmp/storyline/content.json")
        );
    }

    #[test]
    fn missing_state_section_deserializes_to_lazy_default() {
        let cfg = Config::builder()
            .set_default("text.max_sentences", 7_u64)
            .and_then(|b| b.set_default("text.whitespace_collapse", "runs"))
            .and_then(|b| b.set_default("text.truncation", "cap"))
            .and_then(|b| b.set_default("wikipedia.endpoint", DEFAULT_WIKIPEDIA_ENDPOINT))
            .and_then(|b| b.set_default("keywords.service_url", DEFAULT_KEYWORDS_SERVICE_URL))
            .and_then(|b| b.set_default("keywords.version", DEFAULT_KEYWORDS_API_VERSION))
            .and_then(|b| b.set_default("keywords.requests_per_second", 4_u64))
            .and_then(|b| b.set_default("http.timeout_secs", 30_u64))
            .and_then(|b| b.set_default("http.max_retries", 4_u64))
            .expect("defaults")
            .build()
            .expect("build config")
            .try_deserialize::<AppConfig>()
            .expect("deserialize without a state section");
        assert!(cfg.state.path.is_none());
    }
}
