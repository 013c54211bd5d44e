//! Error taxonomy for application services.
//!
//! | Variant | HTTP | Meaning |
//! |---------|------|---------|
//! | [`Validation`](AppError::Validation) | 400 | Missing or malformed input |
//! | [`Authentication`](AppError::Authentication) | 401 | Bad credentials or no valid session |
//! | [`Forbidden`](AppError::Forbidden) | 403 | Row belongs to another user |
//! | [`NotFound`](AppError::NotFound) | 404 | Referenced row does not exist |
//! | [`Storage`](AppError::Storage) | 500 | Database or filesystem failure |
//! | [`Summarize`](AppError::Summarize) | 415 / 422 / 502 | Extraction or provider failure |

use store::StoreError;
use summarize::SummarizeError;
use thiserror::Error;

/// Message returned for credential failures. Identical for unknown email
/// and wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// `message` is safe to show to clients; `detail` carries the cause and
    /// is only meant for logs.
    #[error("{message}")]
    Storage { message: String, detail: String },

    #[error(transparent)]
    Summarize(#[from] SummarizeError),
}

impl AppError {
    pub fn storage(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        AppError::Storage {
            message: message.into(),
            detail: cause.to_string(),
        }
    }

    pub fn invalid_credentials() -> Self {
        AppError::Authentication(INVALID_CREDENTIALS.to_string())
    }

    /// Log-only cause, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AppError::Storage { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::storage("Database operation failed", err)
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_hides_detail_from_display() {
        let err = AppError::storage("DB insert failed", "UNIQUE constraint failed: users.email");
        assert_eq!(err.to_string(), "DB insert failed");
        assert_eq!(err.detail(), Some("UNIQUE constraint failed: users.email"));
    }

    #[test]
    fn summarize_errors_pass_through() {
        let err: AppError = SummarizeError::EmptyText.into();
        assert_eq!(err.to_string(), "no extractable text found in the document");
        assert!(err.detail().is_none());
    }
}
