use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::KeywordsConfig;
use crate::services::context::KeywordExtractor;
use crate::services::http::{
    GenericRateLimiter, HttpOptions, ServiceError, decode_json, rate_limiter,
};

const SERVICE: &str = "keywords";
const STAGE: &str = "watson_analyze";
const ANALYZE_PATH: &str = "v1/analyze";
const BASIC_AUTH_USER: &str = "apikey";

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    text: &'a str,
    features: Features,
}

#[derive(Debug, Serialize)]
struct Features {
    keywords: KeywordsOptions,
}

#[derive(Debug, Default, Serialize)]
struct KeywordsOptions {}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    #[serde(default)]
    keywords: Vec<KeywordResult>,
}

#[derive(Debug, Deserialize)]
struct KeywordResult {
    text: String,
}

/// Extracts keywords with the Watson Natural Language Understanding
/// `analyze` endpoint.
#[derive(Clone)]
pub struct WatsonKeywordClient {
    http: Client,
    analyze_url: Url,
    api_key: String,
    limiter: Arc<GenericRateLimiter>,
    backoff: ExponentialBuilder,
}

impl WatsonKeywordClient {
    pub fn new(
        service_url: &str,
        version: &str,
        api_key: impl Into<String>,
        requests_per_second: u32,
        options: &HttpOptions,
    ) -> Result<Self, ServiceError> {
        let analyze_url = analyze_url(service_url, version)?;
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ServiceError::MissingApiKey {
                service: SERVICE,
                env_hint: "STORYLINE__KEYWORDS__API_KEY",
            });
        }

        Ok(Self {
            http: options.client("storyline-text-robot/0.1")?,
            analyze_url,
            api_key,
            limiter: rate_limiter(requests_per_second),
            backoff: options.backoff(),
        })
    }

    pub fn from_config(config: &KeywordsConfig, options: &HttpOptions) -> Result<Self, ServiceError> {
        Self::new(
            &config.service_url,
            &config.version,
            config.api_key.clone().unwrap_or_default(),
            config.requests_per_second,
            options,
        )
    }

    async fn analyze(&self, sentence: &str) -> Result<Vec<String>, ServiceError> {
        self.limiter.until_ready().await;
        let request = AnalyzeRequest {
            text: sentence,
            features: Features {
                keywords: KeywordsOptions::default(),
            },
        };
        let response = self
            .http
            .post(self.analyze_url.clone())
            .basic_auth(BASIC_AUTH_USER, Some(&self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| ServiceError::request(STAGE, err))?;

        let decoded: AnalyzeResponse = decode_json(STAGE, response).await?;
        Ok(decoded
            .keywords
            .into_iter()
            .map(|keyword| keyword.text)
            .collect())
    }
}

#[async_trait]
impl KeywordExtractor for WatsonKeywordClient {
    async fn extract_keywords(&self, sentence: &str) -> Result<Vec<String>, ServiceError> {
        if sentence.trim().is_empty() {
            return Ok(Vec::new());
        }

        let keywords = (|| self.analyze(sentence))
            .retry(self.backoff.clone())
            .sleep(sleep)
            .when(ServiceError::is_transient)
            .notify(|err: &ServiceError, delay: Duration| {
                warn!(
                    stage = STAGE,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "retrying keyword request"
                );
            })
            .await?;

        debug!(count = keywords.len(), "extracted keywords");
        Ok(keywords)
    }
}

fn analyze_url(service_url: &str, version: &str) -> Result<Url, ServiceError> {
    let invalid = || ServiceError::InvalidEndpoint {
        service: SERVICE,
        url: service_url.to_string(),
    };
    let mut base = Url::parse(service_url).map_err(|_| invalid())?;
    if base.cannot_be_a_base() {
        return Err(invalid());
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let mut url = base.join(ANALYZE_PATH).map_err(|_| invalid())?;
    url.query_pairs_mut().append_pair("version", version);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_url_keeps_instance_path() {
        let url = analyze_url(
            "https://api.example.test/instances/abc-123",
            "2017-02-27",
        )
        .expect("valid url");
        assert_eq!(
            url.as_str(),
            "https://api.example.test/instances/abc-123/v1/analyze?version=2017-02-27"
        );
    }

    #[test]
    fn analyze_url_handles_trailing_slash() {
        let url = analyze_url("http://127.0.0.1:9000/", "2022-04-07").expect("valid url");
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/v1/analyze?version=2022-04-07");
    }

    #[test]
    fn request_body_matches_watson_schema() {
        let body = serde_json::to_value(AnalyzeRequest {
            text: "Ada wrote notes.",
            features: Features {
                keywords: KeywordsOptions::default(),
            },
        })
        .expect("encode request");
        assert_eq!(
            body,
            serde_json::json!({ "text": "Ada wrote notes.", "features": { "keywords": {} } })
        );
    }

    #[tokio::test]
    async fn blank_sentence_skips_the_service() {
        let client = WatsonKeywordClient::new(
            "http://127.0.0.1:9",
            "2017-02-27",
            "key",
            1,
            &HttpOptions::default(),
        )
        .expect("client");
        let keywords = client.extract_keywords("   ").await.expect("blank sentence");
        assert!(keywords.is_empty());
    }
}
