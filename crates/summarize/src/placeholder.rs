use crate::{FlashcardPair, SummarizeError, SummaryLength, SummaryProvider};
use async_trait::async_trait;

pub const PLACEHOLDER_SUMMARY: &str = "This is a test summary.";
pub const PLACEHOLDER_QUESTION: &str = "Sample question?";
pub const PLACEHOLDER_ANSWER: &str = "Sample answer.";

/// Stand-in provider: ignores its input and returns fixed text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderProvider;

#[async_trait]
impl SummaryProvider for PlaceholderProvider {
    fn name(&self) -> &str {
        "placeholder"
    }

    async fn summarize(&self, _text: &str, _length: SummaryLength) -> Result<String, SummarizeError> {
        Ok(PLACEHOLDER_SUMMARY.to_string())
    }

    async fn flashcards(&self, _summary: &str) -> Result<Vec<FlashcardPair>, SummarizeError> {
        Ok(vec![FlashcardPair::new(PLACEHOLDER_QUESTION, PLACEHOLDER_ANSWER)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fixed_text() {
        let p = PlaceholderProvider;
        let s = p.summarize("anything", SummaryLength::Long).await.unwrap();
        assert_eq!(s, PLACEHOLDER_SUMMARY);

        let cards = p.flashcards(&s).await.unwrap();
        assert_eq!(cards, vec![FlashcardPair::new("Sample question?", "Sample answer.")]);
    }
}
