use crate::error::ServerResult;
use crate::extract::{empty_as_default, ApiForm, ApiQuery, AuthUser};
use crate::routes::AffectedRows;
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use intelli_summarize::{Annotation, AnnotationInput};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Body of `/annotations/add`. Missing or blank numbers default to zero.
#[derive(Debug, Deserialize)]
pub struct AddAnnotationForm {
    #[serde(default, deserialize_with = "empty_as_default")]
    pub document_id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub y: f64,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub page: i64,
}

/// Body of `/annotations/update`.
#[derive(Debug, Deserialize)]
pub struct UpdateAnnotationForm {
    #[serde(default, deserialize_with = "empty_as_default")]
    pub id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub x: f64,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub y: f64,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub page: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAnnotationForm {
    #[serde(default, deserialize_with = "empty_as_default")]
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct AnnotationQuery {
    pub document_id: i64,
}

/// Add an annotation owned by the caller
pub async fn add_annotation(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiForm(form): ApiForm<AddAnnotationForm>,
) -> ServerResult<impl IntoResponse> {
    let row = state
        .app
        .add_annotation(
            user.user_id,
            form.document_id,
            AnnotationInput {
                text: form.text,
                x: form.x,
                y: form.y,
                page: form.page,
            },
        )
        .await?;
    Ok(Json(json!({ "success": true, "id": row.id })))
}

/// All annotations on a document
pub async fn get_annotations(
    State(state): State<Arc<ServerState>>,
    _user: AuthUser,
    ApiQuery(query): ApiQuery<AnnotationQuery>,
) -> ServerResult<Json<Vec<Annotation>>> {
    Ok(Json(
        state.app.annotations_for_document(query.document_id).await?,
    ))
}

/// Update an annotation the caller owns
pub async fn update_annotation(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiForm(form): ApiForm<UpdateAnnotationForm>,
) -> ServerResult<Json<AffectedRows>> {
    let rows = state
        .app
        .update_annotation(
            user.user_id,
            form.id,
            AnnotationInput {
                text: form.text,
                x: form.x,
                y: form.y,
                page: form.page,
            },
        )
        .await?;
    Ok(Json(AffectedRows::new(rows)))
}

/// Delete an annotation the caller owns
pub async fn delete_annotation(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiForm(form): ApiForm<DeleteAnnotationForm>,
) -> ServerResult<Json<AffectedRows>> {
    let rows = state.app.delete_annotation(user.user_id, form.id).await?;
    Ok(Json(AffectedRows::new(rows)))
}
