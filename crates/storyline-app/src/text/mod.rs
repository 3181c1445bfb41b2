//! Text utilities kept pure for reuse across services and pipelines.
//!
//! Functions and types exposed here must remain side-effect free so they can
//! be composed from orchestrators without introducing hidden IO or mutable
//! state.

pub mod cleanup;
pub mod segmenter;
pub mod truncate;

pub use cleanup::{
    CleanupOptions, WhitespaceCollapse, remove_blank_lines, remove_dates_in_parentheses,
    remove_markdown, sanitize_text, sanitize_text_with_options,
};
pub use segmenter::{
    EnglishSentenceSegmenter, EnglishSentenceSplit, SegmenterError, SegmenterOptions, Sentences,
};
pub use truncate::{TruncateError, TruncationPolicy, limit_sentences};
