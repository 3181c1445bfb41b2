use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use backon::ExponentialBuilder;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::{Client, Response};
use serde::Deserialize;
use thiserror::Error;

use crate::config::HttpConfig;

pub type GenericRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Error type shared by the HTTP collaborators.
#[derive(Debug, Error, Clone)]
pub enum ServiceError {
    #[error("missing API key for {service}; set {env_hint}")]
    MissingApiKey {
        service: &'static str,
        env_hint: &'static str,
    },
    #[error("invalid {service} endpoint `{url}`")]
    InvalidEndpoint { service: &'static str, url: String },
    #[error("invalid input for `{stage}`: {message}")]
    InvalidInput {
        stage: &'static str,
        message: String,
    },
    #[error("request error during `{stage}`: {source}")]
    Request {
        stage: &'static str,
        #[source]
        source: Arc<reqwest::Error>,
    },
    #[error("unexpected HTTP status {status} during `{stage}`: {message}")]
    HttpStatus {
        stage: &'static str,
        status: u16,
        message: String,
    },
    #[error("failed to read HTTP body during `{stage}`: {source}")]
    Body {
        stage: &'static str,
        #[source]
        source: Arc<reqwest::Error>,
    },
    #[error("JSON decode error during `{stage}`: {source}")]
    Json {
        stage: &'static str,
        #[source]
        source: Arc<serde_json::Error>,
    },
    #[error("remote service rejected `{stage}`: {message}")]
    Remote {
        stage: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn request(stage: &'static str, error: reqwest::Error) -> Self {
        Self::Request {
            stage,
            source: Arc::new(error),
        }
    }

    pub fn body(stage: &'static str, error: reqwest::Error) -> Self {
        Self::Body {
            stage,
            source: Arc::new(error),
        }
    }

    pub fn json(stage: &'static str, error: serde_json::Error) -> Self {
        Self::Json {
            stage,
            source: Arc::new(error),
        }
    }

    pub fn remote(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Remote {
            stage,
            message: message.into(),
        }
    }

    /// Transport failures, throttling and server errors are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request { .. } | Self::Body { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub max_retries: usize,
    pub min_retry_delay: Duration,
    pub max_retry_delay: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 4,
            min_retry_delay: Duration::from_millis(250),
            max_retry_delay: Duration::from_secs(5),
        }
    }
}

impl From<&HttpConfig> for HttpOptions {
    fn from(config: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
            max_retries: config.max_retries,
            ..Self::default()
        }
    }
}

impl HttpOptions {
    pub fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_retry_delay)
            .with_max_delay(self.max_retry_delay)
            .with_max_times(self.max_retries)
            .with_jitter()
    }

    pub fn client(&self, user_agent: &'static str) -> Result<Client, ServiceError> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|err| ServiceError::request("build_client", err))
    }
}

pub fn rate_limiter(requests_per_second: u32) -> Arc<GenericRateLimiter> {
    let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rate)))
}

/// Reads the body of a successful response as JSON, or turns a failed one
/// into [`ServiceError::HttpStatus`] carrying whatever message the service
/// sent back.
pub async fn decode_json<T>(stage: &'static str, response: Response) -> Result<T, ServiceError>
where
    T: for<'de> Deserialize<'de>,
{
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ServiceError::body(stage, err))?;

    if !status.is_success() {
        return Err(ServiceError::HttpStatus {
            stage,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|err| ServiceError::json(stage, err))
}

fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ErrorField {
        Text(String),
        Object { message: String },
    }

    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorField,
    }

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope {
            error: ErrorField::Text(message) | ErrorField::Object { message },
        }) => message,
        Err(_) => body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}
