use thiserror::Error;

use crate::constants::DEFAULT_MAXIMUM_SENTENCES;
use crate::pipeline::content::{Content, Sentence};
use crate::text::{
    CleanupOptions, EnglishSentenceSegmenter, SegmenterError, SegmenterOptions, TruncateError,
    TruncationPolicy, limit_sentences, sanitize_text_with_options,
};

/// Errors emitted by the text processor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessorError {
    #[error("sentence segmenter failed to initialize: {0}")]
    Segmenter(#[from] SegmenterError),
    #[error(transparent)]
    Truncate(#[from] TruncateError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextProcessorOptions {
    pub cleanup: CleanupOptions,
    pub segmenter: SegmenterOptions,
    pub max_sentences: usize,
    pub truncation: TruncationPolicy,
}

impl Default for TextProcessorOptions {
    fn default() -> Self {
        Self {
            cleanup: CleanupOptions::default(),
            segmenter: SegmenterOptions::default(),
            max_sentences: DEFAULT_MAXIMUM_SENTENCES,
            truncation: TruncationPolicy::Cap,
        }
    }
}

/// Applies the local text stages to a content record. All operations are pure
/// apart from mutating the record they are handed, and each stage assigns its
/// result only after it succeeded.
#[derive(Debug, Clone)]
pub struct TextProcessor {
    cleanup: CleanupOptions,
    segmenter: EnglishSentenceSegmenter,
    max_sentences: usize,
    truncation: TruncationPolicy,
}

impl TextProcessor {
    pub fn new(options: TextProcessorOptions) -> Result<Self, ProcessorError> {
        let segmenter = EnglishSentenceSegmenter::new(&options.segmenter)?;
        Ok(Self {
            cleanup: options.cleanup,
            segmenter,
            max_sentences: options.max_sentences,
            truncation: options.truncation,
        })
    }

    pub fn max_sentences(&self) -> usize {
        self.max_sentences
    }

    pub fn sanitize_content(&self, content: &mut Content) {
        content.source_content_sanitized =
            sanitize_text_with_options(&content.source_content_original, self.cleanup);
    }

    pub fn break_content_into_sentences(&self, content: &mut Content) {
        content.sentences = self
            .segmenter
            .sentences(&content.source_content_sanitized)
            .map(Sentence::new)
            .collect();
    }

    pub fn limit_maximum_sentences(&self, content: &mut Content) -> Result<(), ProcessorError> {
        let limited = limit_sentences(
            content.sentences.clone(),
            self.max_sentences,
            self.truncation,
        )?;
        content.sentences = limited;
        content.maximum_sentences = Some(self.max_sentences);
        Ok(())
    }

    /// Sanitize, segment and truncate in one go.
    pub fn process(&self, content: &mut Content) -> Result<(), ProcessorError> {
        let mut staged = content.clone();
        self.sanitize_content(&mut staged);
        self.break_content_into_sentences(&mut staged);
        self.limit_maximum_sentences(&mut staged)?;
        *content = staged;
        Ok(())
    }
}
