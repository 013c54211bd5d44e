//! Summary and flashcard generation.

use crate::error::{AppError, AppResult};
use crate::App;
use store::{Flashcard, NewSummary, Summary};
use summarize::{extract_text, SummaryLength};
use tracing::info;

/// Parameters for [`App::generate_summary`].
#[derive(Debug, Clone, Default)]
pub struct SummaryRequest {
    pub document_id: i64,
    pub length: SummaryLength,
    /// Extra provider attempts for this call; `None` uses the engine default.
    pub retries: Option<u32>,
}

impl App {
    /// Summarize a document the caller owns and store the result.
    pub async fn generate_summary(&self, user_id: i64, req: SummaryRequest) -> AppResult<Summary> {
        let doc = self.owned_document(user_id, req.document_id).await?;

        let bytes = self
            .files()
            .get(&doc.file_path)
            .await
            .map_err(|e| AppError::storage("Failed to read stored document", e))?;
        let text = extract_text(&bytes, &doc.file_name, Some(doc.file_type.as_str()))?;

        let generated = self
            .engine()
            .summarize(&text, req.length, req.retries)
            .await?;

        let summary = self
            .store()
            .insert_summary(&NewSummary {
                document_id: doc.document_id,
                user_id,
                summary_text: generated.value,
                length: req.length.as_str().to_string(),
            })
            .await
            .map_err(|e| AppError::storage("Insert failed", e))?;

        info!(
            user_id,
            document_id = doc.document_id,
            summary_id = summary.summary_id,
            length = %req.length,
            attempts = generated.attempts,
            "summary generated"
        );
        Ok(summary)
    }

    /// Generate flashcards from a summary the caller owns and store them.
    pub async fn generate_flashcards(&self, user_id: i64, summary_id: i64) -> AppResult<Vec<Flashcard>> {
        let summary = self.owned_summary(user_id, summary_id).await?;

        let generated = self.engine().flashcards(&summary.summary_text).await?;
        let pairs: Vec<(String, String)> = generated
            .value
            .into_iter()
            .map(|card| (card.question, card.answer))
            .collect();

        let cards = self
            .store()
            .insert_flashcards(summary_id, &pairs)
            .await
            .map_err(|e| AppError::storage("Insert failed", e))?;

        info!(user_id, summary_id, count = cards.len(), "flashcards generated");
        Ok(cards)
    }

    pub async fn list_summaries(&self, user_id: i64, document_id: Option<i64>) -> AppResult<Vec<Summary>> {
        Ok(self.store().summaries_for_user(user_id, document_id).await?)
    }

    pub async fn list_flashcards(&self, user_id: i64, summary_id: Option<i64>) -> AppResult<Vec<Flashcard>> {
        Ok(self.store().flashcards_for_user(user_id, summary_id).await?)
    }

    pub(crate) async fn owned_summary(&self, user_id: i64, summary_id: i64) -> AppResult<Summary> {
        let summary = self
            .store()
            .get_summary(summary_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Summary not found".into()))?;
        if summary.user_id != user_id {
            return Err(AppError::Forbidden("Summary belongs to another user".into()));
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::UploadedFile;
    use crate::test_support::{temp_app, user};
    use bytes::Bytes;
    use summarize::{SummarizeError, PLACEHOLDER_ANSWER, PLACEHOLDER_QUESTION, PLACEHOLDER_SUMMARY};

    async fn upload(app: &App, user_id: i64, name: &str, body: &'static [u8]) -> i64 {
        app.upload_document(
            user_id,
            UploadedFile {
                file_name: name.into(),
                content_type: None,
                bytes: Bytes::from_static(body),
            },
        )
        .await
        .unwrap()
        .document_id
    }

    fn request(document_id: i64) -> SummaryRequest {
        SummaryRequest {
            document_id,
            ..SummaryRequest::default()
        }
    }

    #[tokio::test]
    async fn summary_then_flashcards() {
        let (app, _dir) = temp_app().await;
        let uid = user(&app, "a@example.com").await;
        let doc = upload(&app, uid, "chapter.txt", b"Rivers carry sediment.").await;

        let summary = app.generate_summary(uid, request(doc)).await.unwrap();
        assert_eq!(summary.summary_text, PLACEHOLDER_SUMMARY);
        assert_eq!(summary.length, "medium");

        let cards = app.generate_flashcards(uid, summary.summary_id).await.unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question, PLACEHOLDER_QUESTION);
        assert_eq!(cards[0].answer, PLACEHOLDER_ANSWER);

        assert_eq!(app.list_summaries(uid, Some(doc)).await.unwrap(), vec![summary.clone()]);
        assert_eq!(app.list_flashcards(uid, None).await.unwrap(), cards);
        assert!(app.list_summaries(uid, Some(doc + 1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ownership_is_enforced() {
        let (app, _dir) = temp_app().await;
        let owner = user(&app, "owner@example.com").await;
        let other = user(&app, "other@example.com").await;
        let doc = upload(&app, owner, "a.txt", b"text").await;

        assert!(matches!(
            app.generate_summary(other, request(doc)).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            app.generate_summary(owner, request(doc + 100)).await,
            Err(AppError::NotFound(_))
        ));

        let summary = app.generate_summary(owner, request(doc)).await.unwrap();
        assert!(matches!(
            app.generate_flashcards(other, summary.summary_id).await,
            Err(AppError::Forbidden(_))
        ));
        assert!(app.list_summaries(other, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsupported_upload_cannot_be_summarized() {
        let (app, _dir) = temp_app().await;
        let uid = user(&app, "a@example.com").await;
        let doc = upload(&app, uid, "photo.png", b"\x89PNG").await;

        let err = app.generate_summary(uid, request(doc)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Summarize(SummarizeError::UnsupportedType(_))
        ));
    }
}
