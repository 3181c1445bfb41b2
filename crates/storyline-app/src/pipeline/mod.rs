//! Pure pipeline transformations that operate on the content record.
//!
//! Modules under this namespace must remain free of IO and external side effects
//! so they can be reused across robots and test harnesses.

pub mod content;
pub mod processor;

pub use content::{Content, Sentence};
pub use processor::{ProcessorError, TextProcessor, TextProcessorOptions};
