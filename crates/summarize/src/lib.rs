//! Summarization for Intelli Summarize.
//!
//! The crate has three parts:
//!
//! - [`SummaryProvider`]: the collaborator that turns document text into a
//!   summary and a summary into flashcards. No concrete model ships; the
//!   [`PlaceholderProvider`] returns fixed text so the rest of the system can
//!   run end to end.
//! - [`SummaryEngine`]: wraps a provider with retry and exponential backoff.
//! - [`extract_text`]: pulls plain text out of an uploaded file so it can be
//!   handed to the provider.
//!
//! ```
//! use summarize::{SummaryEngine, SummaryLength, RetryConfig};
//!
//! let engine = SummaryEngine::placeholder(RetryConfig::default());
//! assert_eq!(engine.provider_name(), "placeholder");
//! assert_eq!("short".parse::<SummaryLength>().unwrap(), SummaryLength::Short);
//! ```

mod engine;
mod error;
mod extract;
mod placeholder;
mod retry;

pub use crate::engine::{Generated, SummaryEngine};
pub use crate::error::SummarizeError;
pub use crate::extract::{extract_text, ContentKind};
pub use crate::placeholder::{
    PlaceholderProvider, PLACEHOLDER_ANSWER, PLACEHOLDER_QUESTION, PLACEHOLDER_SUMMARY,
};
pub use crate::retry::RetryConfig;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested summary size. Bounds are in model tokens and only advisory for
/// providers that do not tokenize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    /// `(min, max)` token budget for the summary.
    pub fn token_bounds(self) -> (u32, u32) {
        match self {
            SummaryLength::Short => (10, 60),
            SummaryLength::Medium => (40, 150),
            SummaryLength::Long => (80, 300),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryLength {
    type Err = SummarizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(SummaryLength::Short),
            "" | "medium" => Ok(SummaryLength::Medium),
            "long" => Ok(SummaryLength::Long),
            other => Err(SummarizeError::InvalidLength(other.to_string())),
        }
    }
}

/// One generated question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashcardPair {
    pub question: String,
    pub answer: String,
}

impl FlashcardPair {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A text-generation backend.
///
/// Implementations must be cheap to share across requests; the engine keeps
/// one behind an `Arc`.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Summarize `text` within the budget of `length`.
    async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String, SummarizeError>;

    /// Produce question/answer pairs from a summary.
    async fn flashcards(&self, summary: &str) -> Result<Vec<FlashcardPair>, SummarizeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_parsing() {
        assert_eq!("SHORT".parse::<SummaryLength>().unwrap(), SummaryLength::Short);
        assert_eq!(" long ".parse::<SummaryLength>().unwrap(), SummaryLength::Long);
        assert_eq!("".parse::<SummaryLength>().unwrap(), SummaryLength::Medium);
        assert!(matches!(
            "huge".parse::<SummaryLength>(),
            Err(SummarizeError::InvalidLength(v)) if v == "huge"
        ));
    }

    #[test]
    fn length_bounds_grow() {
        let (_, short_max) = SummaryLength::Short.token_bounds();
        let (medium_min, medium_max) = SummaryLength::Medium.token_bounds();
        let (long_min, _) = SummaryLength::Long.token_bounds();
        assert!(short_max < medium_max);
        assert!(medium_min < long_min);
        assert_eq!(SummaryLength::default().to_string(), "medium");
    }
}
