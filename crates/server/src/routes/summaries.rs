use crate::error::ServerResult;
use crate::extract::{ApiForm, ApiQuery, AuthUser};
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use intelli_summarize::{AppError, Flashcard, Summary, SummaryLength, SummaryRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct GenerateSummaryForm {
    #[serde(default)]
    pub document_id: i64,
    /// `short`, `medium` or `long`; empty means `medium`.
    #[serde(default)]
    pub length: String,
    /// Extra attempts; capped at `summary_max_retries`.
    pub retries: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct GenerateSummaryResponse {
    pub success: bool,
    pub summary_id: i64,
    pub summary_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub document_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateFlashcardsForm {
    #[serde(default)]
    pub summary_id: i64,
}

#[derive(Debug, Serialize)]
pub struct FlashcardView {
    pub flashcard_id: i64,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateFlashcardsResponse {
    pub success: bool,
    pub flashcards: Vec<FlashcardView>,
}

#[derive(Debug, Deserialize)]
pub struct FlashcardQuery {
    pub summary_id: Option<i64>,
}

/// Summarize one of the caller's documents
pub async fn generate_summary(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiForm(form): ApiForm<GenerateSummaryForm>,
) -> ServerResult<Json<GenerateSummaryResponse>> {
    let length: SummaryLength = form.length.parse().map_err(AppError::from)?;
    let summary = state
        .app
        .generate_summary(
            user.user_id,
            SummaryRequest {
                document_id: form.document_id,
                length,
                retries: state.config.clamp_retries(form.retries),
            },
        )
        .await?;

    Ok(Json(GenerateSummaryResponse {
        success: true,
        summary_id: summary.summary_id,
        summary_text: summary.summary_text,
    }))
}

/// The caller's summaries, optionally for one document
pub async fn list_summaries(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<SummaryQuery>,
) -> ServerResult<Json<Vec<Summary>>> {
    Ok(Json(
        state
            .app
            .list_summaries(user.user_id, query.document_id)
            .await?,
    ))
}

/// Generate flashcards from one of the caller's summaries
pub async fn generate_flashcards(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiForm(form): ApiForm<GenerateFlashcardsForm>,
) -> ServerResult<Json<GenerateFlashcardsResponse>> {
    let cards = state
        .app
        .generate_flashcards(user.user_id, form.summary_id)
        .await?;

    Ok(Json(GenerateFlashcardsResponse {
        success: true,
        flashcards: cards
            .into_iter()
            .map(|card| FlashcardView {
                flashcard_id: card.flashcard_id,
                question: card.question,
                answer: card.answer,
            })
            .collect(),
    }))
}

/// The caller's flashcards, optionally for one summary
pub async fn list_flashcards(
    State(state): State<Arc<ServerState>>,
    user: AuthUser,
    ApiQuery(query): ApiQuery<FlashcardQuery>,
) -> ServerResult<Json<Vec<Flashcard>>> {
    Ok(Json(
        state
            .app
            .list_flashcards(user.user_id, query.summary_id)
            .await?,
    ))
}
