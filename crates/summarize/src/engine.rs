use crate::placeholder::PlaceholderProvider;
use crate::retry::RetryConfig;
use crate::{FlashcardPair, SummarizeError, SummaryLength, SummaryProvider};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Output of a provider call plus how many attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<T> {
    pub value: T,
    pub attempts: u32,
}

/// A [`SummaryProvider`] behind a retry policy.
#[derive(Clone)]
pub struct SummaryEngine {
    provider: Arc<dyn SummaryProvider>,
    retry: RetryConfig,
}

impl std::fmt::Debug for SummaryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryEngine")
            .field("provider", &self.provider.name())
            .field("retry", &self.retry)
            .finish()
    }
}

impl SummaryEngine {
    pub fn new(provider: Arc<dyn SummaryProvider>, retry: RetryConfig) -> Self {
        Self { provider, retry }
    }

    /// Engine backed by [`PlaceholderProvider`].
    pub fn placeholder(retry: RetryConfig) -> Self {
        Self::new(Arc::new(PlaceholderProvider), retry)
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Summarize `text`. `retries` overrides the configured retry count for
    /// this call only.
    pub async fn summarize(
        &self,
        text: &str,
        length: SummaryLength,
        retries: Option<u32>,
    ) -> Result<Generated<String>, SummarizeError> {
        if text.trim().is_empty() {
            return Err(SummarizeError::EmptyText);
        }
        let policy = match retries {
            Some(n) => self.retry.with_max_retries(n),
            None => self.retry,
        };
        self.run("summarize", policy, move || async move {
            let summary = self.provider.summarize(text, length).await?;
            let summary = summary.trim();
            if summary.is_empty() {
                return Err(SummarizeError::Provider(
                    "provider returned no summary".to_string(),
                ));
            }
            Ok(summary.to_string())
        })
        .await
    }

    /// Generate flashcards from a summary.
    pub async fn flashcards(
        &self,
        summary: &str,
    ) -> Result<Generated<Vec<FlashcardPair>>, SummarizeError> {
        if summary.trim().is_empty() {
            return Err(SummarizeError::EmptyText);
        }
        self.run("flashcards", self.retry, move || async move {
            let cards = self.provider.flashcards(summary).await?;
            if cards.is_empty() {
                return Err(SummarizeError::Provider(
                    "provider returned no flashcards".to_string(),
                ));
            }
            Ok(cards)
        })
        .await
    }

    async fn run<T, F, Fut>(
        &self,
        op: &'static str,
        policy: RetryConfig,
        mut call: F,
    ) -> Result<Generated<T>, SummarizeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SummarizeError>>,
    {
        let start = Instant::now();
        let total = policy.total_attempts();
        let mut last = None;

        for attempt in 0..total {
            let delay = policy.calculate_delay(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match call().await {
                Ok(value) => {
                    debug!(
                        op,
                        provider = self.provider.name(),
                        attempts = attempt + 1,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "provider call succeeded"
                    );
                    return Ok(Generated {
                        value,
                        attempts: attempt + 1,
                    });
                }
                // Input problems will not improve on retry.
                Err(err) if err.is_client_error() => return Err(err),
                Err(err) => {
                    warn!(
                        op,
                        provider = self.provider.name(),
                        attempt = attempt + 1,
                        total,
                        error = %err,
                        "provider call failed"
                    );
                    last = Some(err);
                }
            }
        }

        Err(SummarizeError::Exhausted {
            attempts: total,
            last: last.map(|e| e.to_string()).unwrap_or_default(),
        })
    }
}
