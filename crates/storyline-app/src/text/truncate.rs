use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use thiserror::Error;

/// What to do when fewer sentences are available than requested.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TruncationPolicy {
    /// Keep whatever is available, up to the bound.
    #[default]
    Cap,
    /// Require at least the bound.
    Strict,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TruncateError {
    #[error("expected at least {expected} sentences, only {available} available")]
    InsufficientSentences { expected: usize, available: usize },
}

/// Keeps the first `max` items in their original order.
pub fn limit_sentences<T>(
    mut items: Vec<T>,
    max: usize,
    policy: TruncationPolicy,
) -> Result<Vec<T>, TruncateError> {
    if policy == TruncationPolicy::Strict && items.len() < max {
        return Err(TruncateError::InsufficientSentences {
            expected: max,
            available: items.len(),
        });
    }
    items.truncate(max);
    Ok(items)
}
