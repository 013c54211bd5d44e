use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

/// A login session. Only the hash of the bearer token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token_hash: String,
    pub user_id: i64,
    pub created_at: String,
    pub expires_at: String,
}

/// Metadata row for an uploaded file. `file_path` is the stored name
/// inside the upload directory, not an absolute path.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Document {
    pub document_id: i64,
    pub user_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub uploaded_at: String,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: i64,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
}

/// A positioned note on a document page.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    pub user_id: i64,
    pub document_id: i64,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: i64,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewAnnotation {
    pub user_id: i64,
    pub document_id: i64,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: i64,
}

/// Replacement values for an existing annotation.
#[derive(Debug, Clone)]
pub struct AnnotationPatch {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: i64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Summary {
    pub summary_id: i64,
    pub document_id: i64,
    pub user_id: i64,
    pub summary_text: String,
    pub length: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewSummary {
    pub document_id: i64,
    pub user_id: i64,
    pub summary_text: String,
    pub length: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Flashcard {
    pub flashcard_id: i64,
    pub summary_id: i64,
    pub question: String,
    pub answer: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Feedback {
    pub feedback_id: i64,
    pub summary_id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub comments: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub summary_id: i64,
    pub user_id: i64,
    pub rating: i64,
    pub comments: String,
}

/// Outcome of a write that is only allowed for the row's owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedWrite {
    /// The row belonged to the caller; carries the affected-row count.
    Applied(u64),
    /// No row with that id.
    Missing,
    /// The row exists but belongs to someone else. Nothing was written.
    NotOwner,
}
