//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `auth`: signup, login, logout
//! - `documents`: uploads and listing
//! - `annotations`: annotation CRUD
//! - `summaries`: summary and flashcard generation
//! - `feedback`: ratings on summaries
//! - `pages`: HTML pages and the catch-all fallback

pub mod annotations;
pub mod auth;
pub mod documents;
pub mod feedback;
pub mod health;
pub mod pages;
pub mod summaries;

use crate::error::ServerError;
use serde::Serialize;

/// 405 handler for known paths hit with the wrong method.
pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}

/// `{"success": true, "affected_rows": n}`
#[derive(Debug, Serialize)]
pub struct AffectedRows {
    pub success: bool,
    pub affected_rows: u64,
}

impl AffectedRows {
    pub fn new(affected_rows: u64) -> Self {
        Self {
            success: true,
            affected_rows,
        }
    }
}
