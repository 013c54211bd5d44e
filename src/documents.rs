//! Document uploads, listing, and orphan reconciliation.

use crate::error::{AppError, AppResult};
use crate::files::{is_feedback_snapshot, sanitize_file_name, stored_name};
use crate::App;
use bytes::Bytes;
use std::time::{Duration, SystemTime};
use store::{Document, NewDocument};
use tracing::{error, info, warn};

pub const MOVE_FAILED: &str = "Failed to move uploaded file";
pub const INSERT_FAILED: &str = "DB insert failed";

/// One file received from a client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Name as sent by the client; may contain directories.
    pub file_name: String,
    /// Declared MIME type, if any.
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Per-file result of a multi-file upload.
#[derive(Debug)]
pub struct UploadOutcome {
    /// Sanitized original name (or the raw name when sanitizing left nothing).
    pub file_name: String,
    pub result: AppResult<Document>,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// What an orphan sweep found and removed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub removed: Vec<String>,
}

impl App {
    /// Store one file and record it for `user_id`.
    ///
    /// If the row insert fails the stored file is removed again.
    pub async fn upload_document(&self, user_id: i64, file: UploadedFile) -> AppResult<Document> {
        let original = sanitize_file_name(&file.file_name);
        if original.is_empty() {
            return Err(AppError::Validation("Missing file name".into()));
        }

        let stored = stored_name(&original);
        self.files()
            .put(&stored, &file.bytes)
            .await
            .map_err(|e| AppError::storage(MOVE_FAILED, e))?;

        let file_type = file
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&original)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        let new = NewDocument {
            user_id,
            file_name: original,
            file_path: stored.clone(),
            file_type,
        };
        match self.store().insert_document(&new).await {
            Ok(doc) => {
                info!(
                    user_id,
                    document_id = doc.document_id,
                    file_path = %doc.file_path,
                    len = file.bytes.len(),
                    "document uploaded"
                );
                Ok(doc)
            }
            Err(err) => {
                if let Err(cleanup) = self.files().remove(&stored).await {
                    error!(file_path = %stored, error = %cleanup, "failed to remove file after insert failure");
                }
                Err(AppError::storage(INSERT_FAILED, err))
            }
        }
    }

    /// Store every file independently. The outcome list has one entry per
    /// input file, in order; a failure never stops the remaining files.
    pub async fn upload_documents(&self, user_id: i64, files: Vec<UploadedFile>) -> Vec<UploadOutcome> {
        let mut outcomes = Vec::with_capacity(files.len());
        for file in files {
            let shown = match sanitize_file_name(&file.file_name) {
                name if name.is_empty() => file.file_name.clone(),
                name => name,
            };
            let result = self.upload_document(user_id, file).await;
            if let Err(err) = &result {
                warn!(user_id, file_name = %shown, error = %err, detail = ?err.detail(), "upload failed");
            }
            outcomes.push(UploadOutcome {
                file_name: shown,
                result,
            });
        }
        outcomes
    }

    pub async fn list_documents(&self, user_id: i64) -> AppResult<Vec<Document>> {
        Ok(self.store().documents_for_user(user_id).await?)
    }

    /// Look up a document the caller owns.
    pub(crate) async fn owned_document(&self, user_id: i64, document_id: i64) -> AppResult<Document> {
        let doc = self
            .store()
            .get_document(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".into()))?;
        if doc.user_id != user_id {
            return Err(AppError::Forbidden("Document belongs to another user".into()));
        }
        Ok(doc)
    }

    /// Delete stored files no document row references. Feedback snapshots
    /// and files younger than `grace` are left alone.
    pub async fn sweep_orphans(&self, grace: Duration) -> AppResult<SweepReport> {
        let files = self
            .files()
            .list()
            .await
            .map_err(|e| AppError::storage("Failed to list upload directory", e))?;
        let referenced = self.store().referenced_file_paths().await?;
        let cutoff = SystemTime::now()
            .checked_sub(grace)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut report = SweepReport {
            scanned: files.len(),
            removed: Vec::new(),
        };
        for file in files {
            if referenced.contains(&file.name)
                || is_feedback_snapshot(&file.name)
                || file.modified > cutoff
            {
                continue;
            }
            match self.files().remove(&file.name).await {
                Ok(()) => report.removed.push(file.name),
                Err(err) => warn!(file = %file.name, error = %err, "failed to remove orphan"),
            }
        }

        info!(
            scanned = report.scanned,
            removed = report.removed.len(),
            "orphan sweep finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::feedback_snapshot_name;
    use crate::test_support::{temp_app, user};

    fn text_file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.into(),
            content_type: None,
            bytes: Bytes::from_static(b"body"),
        }
    }

    #[tokio::test]
    async fn upload_records_sanitized_name_and_guessed_type() {
        let (app, _dir) = temp_app().await;
        let uid = user(&app, "a@example.com").await;

        let doc = app.upload_document(uid, text_file("../x/notes.txt")).await.unwrap();
        assert_eq!(doc.file_name, "notes.txt");
        assert_eq!(doc.file_type, "text/plain");
        assert!(doc.file_path.ends_with("_notes.txt"));
        assert_eq!(app.files().get(&doc.file_path).await.unwrap(), b"body");

        assert_eq!(app.list_documents(uid).await.unwrap(), vec![doc]);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let (app, _dir) = temp_app().await;
        let uid = user(&app, "a@example.com").await;
        assert!(matches!(
            app.upload_document(uid, text_file("dir/")).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn documents_are_scoped_to_their_owner() {
        let (app, _dir) = temp_app().await;
        let a = user(&app, "a@example.com").await;
        let b = user(&app, "b@example.com").await;
        app.upload_document(a, text_file("a.txt")).await.unwrap();

        assert_eq!(app.list_documents(a).await.unwrap().len(), 1);
        assert!(app.list_documents(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sweep_removes_only_unreferenced_files() {
        let (app, _dir) = temp_app().await;
        let uid = user(&app, "a@example.com").await;
        let doc = app.upload_document(uid, text_file("kept.txt")).await.unwrap();
        app.files().put("123_deadbeef_orphan.txt", b"x").await.unwrap();
        app.files().put(&feedback_snapshot_name(1), b"{}").await.unwrap();

        // A long grace period protects everything.
        let report = app.sweep_orphans(Duration::from_secs(3600)).await.unwrap();
        assert!(report.removed.is_empty());

        let report = app.sweep_orphans(Duration::ZERO).await.unwrap();
        assert_eq!(report.scanned, 3);
        assert_eq!(report.removed, vec!["123_deadbeef_orphan.txt".to_string()]);
        assert!(app.files().get(&doc.file_path).await.is_ok());
    }
}
