use thiserror::Error;

/// Errors raised while extracting text or generating summaries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummarizeError {
    /// The file kind has no extractor (or its feature is disabled).
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    /// Extraction produced no text.
    #[error("no extractable text found in the document")]
    EmptyText,

    /// The extractor failed on the file contents.
    #[error("text extraction failed: {0}")]
    Extraction(String),

    /// `length` was not one of short, medium, long.
    #[error("invalid summary length '{0}'; use short|medium|long")]
    InvalidLength(String),

    /// A single provider call failed.
    #[error("provider error: {0}")]
    Provider(String),

    /// Every attempt failed; carries the attempt count and last error.
    #[error("summarization failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

impl SummarizeError {
    /// True for errors caused by the request rather than the provider.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SummarizeError::UnsupportedType(_)
                | SummarizeError::EmptyText
                | SummarizeError::Extraction(_)
                | SummarizeError::InvalidLength(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_message_carries_context() {
        let err = SummarizeError::Exhausted {
            attempts: 3,
            last: "provider error: timeout".into(),
        };
        assert_eq!(
            err.to_string(),
            "summarization failed after 3 attempts: provider error: timeout"
        );
        assert!(!err.is_client_error());
        assert!(SummarizeError::EmptyText.is_client_error());
    }
}
