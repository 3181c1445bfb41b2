use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, Url, header};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::WikipediaConfig;
use crate::services::context::ContentSource;
use crate::services::http::{HttpOptions, ServiceError, decode_json};

const SERVICE: &str = "wikipedia";
const STAGE: &str = "wikipedia_parser";

#[derive(Debug, Deserialize)]
struct AlgorithmiaResponse {
    #[serde(default)]
    result: Option<WikipediaArticle>,
    #[serde(default)]
    error: Option<AlgorithmiaError>,
}

#[derive(Debug, Deserialize)]
struct WikipediaArticle {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlgorithmiaError {
    message: String,
}

/// Fetches article text through the Algorithmia `web/WikipediaParser`
/// algorithm.
#[derive(Clone)]
pub struct WikipediaClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    backoff: ExponentialBuilder,
}

impl WikipediaClient {
    pub fn new(
        endpoint: &str,
        api_key: impl Into<String>,
        options: &HttpOptions,
    ) -> Result<Self, ServiceError> {
        let endpoint = Url::parse(endpoint).map_err(|_| ServiceError::InvalidEndpoint {
            service: SERVICE,
            url: endpoint.to_string(),
        })?;
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ServiceError::MissingApiKey {
                service: SERVICE,
                env_hint: "STORYLINE__WIKIPEDIA__API_KEY",
            });
        }

        Ok(Self {
            http: options.client("storyline-text-robot/0.1")?,
            endpoint,
            api_key,
            backoff: options.backoff(),
        })
    }

    pub fn from_config(config: &WikipediaConfig, options: &HttpOptions) -> Result<Self, ServiceError> {
        Self::new(
            &config.endpoint,
            config.api_key.clone().unwrap_or_default(),
            options,
        )
    }

    async fn request_article(&self, search_term: &str) -> Result<String, ServiceError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(header::AUTHORIZATION, format!("Simple {}", self.api_key))
            .json(&search_term)
            .send()
            .await
            .map_err(|err| ServiceError::request(STAGE, err))?;

        let decoded: AlgorithmiaResponse = decode_json(STAGE, response).await?;
        if let Some(error) = decoded.error {
            return Err(ServiceError::remote(STAGE, error.message));
        }
        decoded
            .result
            .and_then(|article| article.content)
            .ok_or_else(|| ServiceError::remote(STAGE, "response carried no article content"))
    }
}

#[async_trait]
impl ContentSource for WikipediaClient {
    async fn fetch_content(&self, search_term: &str) -> Result<String, ServiceError> {
        let search_term = search_term.trim();
        if search_term.is_empty() {
            return Err(ServiceError::InvalidInput {
                stage: STAGE,
                message: "search term must not be empty".to_string(),
            });
        }

        let content = (|| self.request_article(search_term))
            .retry(self.backoff.clone())
            .sleep(sleep)
            .when(ServiceError::is_transient)
            .notify(|err: &ServiceError, delay: Duration| {
                warn!(
                    stage = STAGE,
                    search_term,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "retrying article request"
                );
            })
            .await?;

        debug!(search_term, chars = content.chars().count(), "fetched article");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_api_key() {
        let err = WikipediaClient::new("https://example.test/algo", "  ", &HttpOptions::default())
            .err()
            .expect("blank key must be rejected");
        assert!(matches!(err, ServiceError::MissingApiKey { .. }));
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let err = WikipediaClient::new("not a url", "key", &HttpOptions::default())
            .err()
            .expect("invalid endpoint must be rejected");
        assert!(matches!(err, ServiceError::InvalidEndpoint { .. }));
    }

    #[test]
    fn decodes_algorithmia_envelope() {
        let decoded: AlgorithmiaResponse = serde_json::from_str(
            r#"{"result":{"content":"Body text","title":"T"},"metadata":{"duration":0.1}}"#,
        )
        .expect("decode envelope");
        assert_eq!(
            decoded.result.and_then(|article| article.content).as_deref(),
            Some("Body text")
        );
    }
}
