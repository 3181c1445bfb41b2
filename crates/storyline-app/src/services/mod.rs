//! Orchestration layer for IO-bound pipeline services.
//!
//! Modules exposed here talk to external systems (the encyclopedia parser, the
//! keyword service, the state file) and must avoid embedding pure transforms.
//! Keep stateless helpers in `crate::text` or `crate::pipeline`.

pub mod context;
pub mod http;
pub mod keywords;
pub mod robot;
pub mod wikipedia;

pub use context::{
    ContentSource, KeywordExtractor, PipelineError, PipelineResult, RobotOverrides,
    build_text_robot, processor_options,
};
pub use http::{GenericRateLimiter, HttpOptions, ServiceError};
pub use keywords::WatsonKeywordClient;
pub use robot::{RobotRequest, TextRobot};
pub use wikipedia::WikipediaClient;
