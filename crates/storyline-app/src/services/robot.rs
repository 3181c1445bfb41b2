use std::sync::Arc;

use tracing::{debug, info};

use crate::pipeline::{Content, TextProcessor};
use crate::services::context::{
    ContentSource, KeywordExtractor, PipelineError, PipelineResult,
};
use crate::state::StateStore;

/// Inputs for one robot run. Anything left `None` falls back to the stored
/// content record.
#[derive(Debug, Clone, Default)]
pub struct RobotRequest {
    pub search_term: Option<String>,
    pub prefix: Option<String>,
}

/// Turns a search term into narration-ready, keyword-annotated sentences and
/// persists them in the shared content record.
pub struct TextRobot {
    processor: TextProcessor,
    source: Arc<dyn ContentSource>,
    keywords: Option<Arc<dyn KeywordExtractor>>,
    store: StateStore,
}

impl TextRobot {
    pub fn new(
        processor: TextProcessor,
        source: Arc<dyn ContentSource>,
        keywords: Option<Arc<dyn KeywordExtractor>>,
        store: StateStore,
    ) -> Self {
        Self {
            processor,
            source,
            keywords,
            store,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Runs every stage in order. The state file is only written once all of
    /// them succeeded.
    pub async fn run(&self, request: RobotRequest) -> PipelineResult<Content> {
        let mut content = self.store.load().await?;
        if let Some(search_term) = request.search_term {
            content.search_term = search_term;
        }
        if request.prefix.is_some() {
            content.prefix = request.prefix;
        }
        if content.search_term.trim().is_empty() {
            return Err(PipelineError::MissingSearchTerm);
        }

        info!(
            search_term = %content.search_term,
            max_sentences = self.processor.max_sentences(),
            "text robot starting"
        );

        self.fetch_content(&mut content).await?;
        self.processor.sanitize_content(&mut content);
        self.processor.break_content_into_sentences(&mut content);
        debug!(
            sentences = content.sentences.len(),
            "segmented sanitized content"
        );
        self.processor.limit_maximum_sentences(&mut content)?;
        self.fetch_keywords_of_all_sentences(&mut content).await?;

        self.store.save(&content).await?;
        info!(
            search_term = %content.search_term,
            sentences = content.sentences.len(),
            path = %self.store.path().display(),
            "text robot finished"
        );
        Ok(content)
    }

    async fn fetch_content(&self, content: &mut Content) -> PipelineResult<()> {
        let raw = self
            .source
            .fetch_content(&content.search_term)
            .await
            .map_err(|source| PipelineError::ContentFetch {
                search_term: content.search_term.clone(),
                source,
            })?;
        content.source_content_original = raw;
        Ok(())
    }

    async fn fetch_keywords_of_all_sentences(&self, content: &mut Content) -> PipelineResult<()> {
        let Some(extractor) = &self.keywords else {
            debug!("keyword extraction disabled; leaving keyword slots empty");
            return Ok(());
        };

        let mut all_keywords = Vec::with_capacity(content.sentences.len());
        for (index, sentence) in content.sentences.iter().enumerate() {
            let keywords = extractor
                .extract_keywords(&sentence.text)
                .await
                .map_err(|source| PipelineError::Keywords { index, source })?;
            debug!(index, count = keywords.len(), "annotated sentence");
            all_keywords.push(keywords);
        }

        for (sentence, keywords) in content.sentences.iter_mut().zip(all_keywords) {
            sentence.keywords = keywords;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::TextProcessorOptions;
    use crate::services::http::ServiceError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct StaticSource(&'static str);

    #[async_trait]
    impl ContentSource for StaticSource {
        async fn fetch_content(&self, _search_term: &str) -> Result<String, ServiceError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingExtractor {
        calls: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl KeywordExtractor for RecordingExtractor {
        async fn extract_keywords(&self, sentence: &str) -> Result<Vec<String>, ServiceError> {
            let mut calls = self.calls.lock().expect("call log mutex poisoned");
            let index = calls.len();
            calls.push(sentence.to_string());
            if self.fail_on == Some(index) {
                return Err(ServiceError::remote("test", "boom"));
            }
            let first_word = sentence.split_whitespace().next().unwrap_or_default();
            Ok(vec![first_word.to_string()])
        }
    }

    const ARTICLE: &str = "Ada Lovelace (1815–1852) was a mathematician.\n\n== Life ==\nShe wrote notes. Dr. Babbage built engines.";

    fn robot(
        temp: &TempDir,
        keywords: Option<Arc<dyn KeywordExtractor>>,
    ) -> TextRobot {
        TextRobot::new(
            TextProcessor::new(TextProcessorOptions::default()).expect("processor"),
            Arc::new(StaticSource(ARTICLE)),
            keywords,
            StateStore::new(temp.path().join("content.json")),
        )
    }

    #[tokio::test]
    async fn run_annotates_and_persists_sentences() {
        let temp = TempDir::new().expect("temp dir");
        let extractor = Arc::new(RecordingExtractor::default());
        let robot = robot(&temp, Some(extractor.clone()));

        let content = robot
            .run(RobotRequest {
                search_term: Some("Ada Lovelace".to_string()),
                prefix: Some("Who is".to_string()),
            })
            .await
            .expect("robot run");

        assert_eq!(
            content.sentence_texts().collect::<Vec<_>>(),
            vec![
                "Ada Lovelace was a mathematician.",
                "She wrote notes.",
                "Dr. Babbage built engines."
            ]
        );
        assert_eq!(content.sentences[2].keywords, vec!["Dr.".to_string()]);
        assert_eq!(extractor.calls.lock().expect("calls").len(), 3);

        let stored = robot.store().load().await.expect("reload state");
        assert_eq!(stored, content);
        assert_eq!(stored.prefix.as_deref(), Some("Who is"));
    }

    #[tokio::test]
    async fn missing_search_term_is_reported() {
        let temp = TempDir::new().expect("temp dir");
        let robot = robot(&temp, None);
        let err = robot.run(RobotRequest::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingSearchTerm));
    }

    #[tokio::test]
    async fn stored_search_term_is_reused() {
        let temp = TempDir::new().expect("temp dir");
        let robot = robot(&temp, None);
        robot
            .store()
            .save(&Content::new("Ada Lovelace"))
            .await
            .expect("seed state");

        let content = robot.run(RobotRequest::default()).await.expect("robot run");
        assert_eq!(content.search_term, "Ada Lovelace");
        assert!(content.sentences.iter().all(|s| s.keywords.is_empty()));
    }

    #[tokio::test]
    async fn keyword_failure_keeps_state_untouched() {
        let temp = TempDir::new().expect("temp dir");
        let extractor = Arc::new(RecordingExtractor {
            fail_on: Some(1),
            ..RecordingExtractor::default()
        });
        let robot = robot(&temp, Some(extractor));
        let seed = Content::new("Ada Lovelace");
        robot.store().save(&seed).await.expect("seed state");

        let err = robot.run(RobotRequest::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Keywords { index: 1, .. }), "got {err:?}");
        assert_eq!(robot.store().load().await.expect("reload"), seed);
    }
}
