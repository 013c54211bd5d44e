//! Positioned notes on uploaded documents.
//!
//! Creation takes the user from the session and inserts without looking
//! up the document. Updates and deletes are restricted to the
//! annotation's owner; the check and the write share a transaction in the
//! store.

use crate::error::{AppError, AppResult};
use crate::App;
use store::{Annotation, AnnotationPatch, NewAnnotation, OwnedWrite};
use tracing::{info, warn};

/// Text and position of an annotation. Coordinates are page-relative and
/// unchecked.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationInput {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: i64,
}

impl App {
    /// Create an annotation owned by `user_id` on `document_id`.
    pub async fn add_annotation(
        &self,
        user_id: i64,
        document_id: i64,
        input: AnnotationInput,
    ) -> AppResult<Annotation> {
        let row = self
            .store()
            .insert_annotation(&NewAnnotation {
                user_id,
                document_id,
                text: input.text,
                x: input.x,
                y: input.y,
                page: input.page,
            })
            .await
            .map_err(|e| AppError::storage("Insert failed", e))?;

        info!(user_id, document_id, id = row.id, "annotation added");
        Ok(row)
    }

    /// All annotations on a document, oldest first.
    pub async fn annotations_for_document(&self, document_id: i64) -> AppResult<Vec<Annotation>> {
        Ok(self.store().annotations_for_document(document_id).await?)
    }

    /// Replace an annotation's text and position. Returns the number of rows
    /// changed, which is 0 when `id` does not exist.
    pub async fn update_annotation(
        &self,
        user_id: i64,
        id: i64,
        input: AnnotationInput,
    ) -> AppResult<u64> {
        let patch = AnnotationPatch {
            text: input.text,
            x: input.x,
            y: input.y,
            page: input.page,
        };
        let outcome = self.store().update_annotation(id, user_id, &patch).await?;
        owned_write(outcome, user_id, id, "update")
    }

    /// Delete an annotation. Returns 0 when `id` does not exist.
    pub async fn delete_annotation(&self, user_id: i64, id: i64) -> AppResult<u64> {
        let outcome = self.store().delete_annotation(id, user_id).await?;
        owned_write(outcome, user_id, id, "delete")
    }
}

fn owned_write(outcome: OwnedWrite, user_id: i64, id: i64, op: &str) -> AppResult<u64> {
    match outcome {
        OwnedWrite::Applied(rows) => {
            info!(user_id, id, op, rows, "annotation written");
            Ok(rows)
        }
        OwnedWrite::Missing => Ok(0),
        OwnedWrite::NotOwner => {
            warn!(user_id, id, op, "annotation owned by another user");
            Err(AppError::Forbidden("Annotation belongs to another user".into()))
        }
    }
}
