use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use intelli_summarize::{AppError, SummarizeError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Upload exceeds the size limit")]
    PayloadTooLarge,

    #[error("Not found")]
    NotFound,

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::App(err) => app_status(err),
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to clients.
    fn public_message(&self) -> String {
        match self {
            ServerError::App(AppError::Summarize(SummarizeError::UnsupportedType(_))) => {
                "Unsupported file type".to_string()
            }
            ServerError::Internal(_) | ServerError::Config(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

fn app_status(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
        AppError::Forbidden(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Summarize(err) => match err {
            SummarizeError::UnsupportedType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            SummarizeError::EmptyText | SummarizeError::Extraction(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SummarizeError::InvalidLength(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            let detail = match &self {
                ServerError::App(err) => err.detail().map(str::to_owned),
                _ => None,
            };
            tracing::error!(
                status = status.as_u16(),
                error = %self,
                detail = detail.as_deref().unwrap_or(""),
                "request failed"
            );
        }

        let body = Json(ErrorResponse {
            error: self.public_message(),
        });
        (status, body).into_response()
    }
}

impl From<FormRejection> for ServerError {
    fn from(rejection: FormRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ServerError {
    fn from(rejection: MultipartRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge
        } else {
            ServerError::BadRequest(err.body_text())
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_errors_map_to_statuses() {
        let cases = [
            (AppError::Validation("Missing fields".into()), StatusCode::BAD_REQUEST),
            (AppError::invalid_credentials(), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::storage("Insert failed", "disk"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                AppError::Summarize(SummarizeError::UnsupportedType("image/png".into())),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (AppError::Summarize(SummarizeError::EmptyText), StatusCode::UNPROCESSABLE_ENTITY),
            (
                AppError::Summarize(SummarizeError::Exhausted {
                    attempts: 2,
                    last: "down".into(),
                }),
                StatusCode::BAD_GATEWAY,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).status_code(), status);
        }
    }

    #[test]
    fn test_public_messages() {
        let unsupported = ServerError::from(AppError::Summarize(SummarizeError::UnsupportedType(
            "image/png".into(),
        )));
        assert_eq!(unsupported.public_message(), "Unsupported file type");

        let storage = ServerError::from(AppError::storage("DB insert failed", "constraint"));
        assert_eq!(storage.public_message(), "DB insert failed");

        assert_eq!(ServerError::MethodNotAllowed.public_message(), METHOD_NOT_ALLOWED);
        assert_eq!(
            ServerError::Internal("secret path".into()).public_message(),
            "Internal server error"
        );
    }
}
