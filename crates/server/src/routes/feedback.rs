use crate::error::ServerResult;
use crate::extract::{empty_as_default, ApiForm, ApiQuery, AuthUser};
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use intelli_summarize::Feedback;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct FeedbackForm {
    #[serde(default, deserialize_with = "empty_as_default")]
    pub summary_id: i64,
    #[serde(default, deserialize_with = "empty_as_default")]
    pub rating: i64,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub success: bool,
    pub feedback_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct FeedbackQuery {
    pub summary_id: Option<i64>,
}

/// Rate a summary
pub async fn give_feedback(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiForm(form): ApiForm<FeedbackForm>,
) -> ServerResult<Json<FeedbackResponse>> {
    let receipt = state
        .app
        .give_feedback(user.user_id, form.summary_id, form.rating, &form.comments)
        .await?;

    Ok(Json(FeedbackResponse {
        success: true,
        feedback_id: receipt.feedback.feedback_id,
        warning: receipt.warning(),
    }))
}

/// The caller's feedback, optionally for one summary
pub async fn list_feedback(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<FeedbackQuery>,
) -> ServerResult<Json<Vec<Feedback>>> {
    Ok(Json(
        state
            .app
            .list_feedback(user.user_id, query.summary_id)
            .await?,
    ))
}
