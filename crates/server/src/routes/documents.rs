use crate::error::{ServerError, ServerResult};
use crate::extract::AuthUser;
use crate::state::ServerState;
use axum::extract::multipart::{Field, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use intelli_summarize::{AppError, Document, UploadedFile};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub document_id: i64,
    pub file_name: String,
}

/// One entry of a multi-file upload response.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadEntry {
    Stored(UploadResponse),
    Failed {
        success: bool,
        error: String,
        file: String,
    },
}

/// Parsed multipart upload body.
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<UploadedFile>,
    user_id: Option<String>,
}

async fn read_upload_form(
    multipart: Result<Multipart, MultipartRejection>,
    file_fields: &[&str],
) -> ServerResult<UploadForm> {
    let mut multipart = multipart?;
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if file_fields.contains(&name.as_str()) {
            form.files.push(read_file(field).await?);
        } else if name == "user_id" {
            form.user_id = Some(field.text().await?);
        }
    }
    Ok(form)
}

async fn read_file(field: Field<'_>) -> ServerResult<UploadedFile> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_owned);
    let bytes = field.bytes().await?;
    Ok(UploadedFile {
        file_name,
        content_type,
        bytes,
    })
}

/// A `user_id` form field, when sent, must name the session user.
fn check_claimed_user(claimed: Option<&str>, user: &AuthUser) -> ServerResult<()> {
    let Some(claimed) = claimed.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(());
    };
    match claimed.parse::<i64>() {
        Ok(id) if id == user.user_id => Ok(()),
        Ok(_) => Err(AppError::Forbidden("user_id does not match the session".into()).into()),
        Err(_) => Err(ServerError::BadRequest(format!("Invalid user_id '{claimed}'"))),
    }
}

/// Upload a single file (multipart field `file`)
pub async fn upload_single(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<impl IntoResponse> {
    let mut form = read_upload_form(multipart, &["file"]).await?;
    check_claimed_user(form.user_id.as_deref(), &user)?;
    if form.files.is_empty() {
        return Err(AppError::Validation("No file uploaded".into()).into());
    }

    let file = form.files.swap_remove(0);
    let doc = state.app.upload_document(user.user_id, file).await?;
    Ok(Json(UploadResponse {
        success: true,
        document_id: doc.document_id,
        file_name: doc.file_name,
    }))
}

/// Upload several files (multipart fields `files` or `files[]`)
///
/// Every file is handled independently; the response has one entry per
/// file, in the order they were sent.
pub async fn upload_multiple(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServerResult<impl IntoResponse> {
    let form = read_upload_form(multipart, &["files", "files[]"]).await?;
    check_claimed_user(form.user_id.as_deref(), &user)?;
    if form.files.is_empty() {
        return Err(AppError::Validation("No files uploaded".into()).into());
    }

    let entries: Vec<UploadEntry> = state
        .app
        .upload_documents(user.user_id, form.files)
        .await
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(doc) => UploadEntry::Stored(UploadResponse {
                success: true,
                document_id: doc.document_id,
                file_name: doc.file_name,
            }),
            Err(err) => UploadEntry::Failed {
                success: false,
                error: err.to_string(),
                file: outcome.file_name,
            },
        })
        .collect();

    Ok(Json(entries))
}

/// List the caller's documents
pub async fn list_documents(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
) -> ServerResult<Json<Vec<Document>>> {
    Ok(Json(state.app.list_documents(user.user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser {
            user_id: 7,
            token: "t".into(),
        }
    }

    #[test]
    fn test_claimed_user_must_match_session() {
        assert!(check_claimed_user(None, &user()).is_ok());
        assert!(check_claimed_user(Some(""), &user()).is_ok());
        assert!(check_claimed_user(Some("7"), &user()).is_ok());
        assert!(matches!(
            check_claimed_user(Some("8"), &user()),
            Err(ServerError::App(AppError::Forbidden(_)))
        ));
        assert!(matches!(
            check_claimed_user(Some("seven"), &user()),
            Err(ServerError::BadRequest(_))
        ));
    }
}
