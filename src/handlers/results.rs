// src/handlers/results.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::result::{GradebookEntry, HistoryEntry},
    state::AppState,
};

fn default_published() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default = "default_published")]
    pub published: bool,
}

/// Teacher gradebook: every recorded result for one quiz, newest first.
pub async fn gradebook(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let results = state.services.results.results_for_quiz(quiz_id).await?;
    let entries: Vec<GradebookEntry> = results.iter().map(GradebookEntry::from).collect();

    Ok(Json(entries))
}

/// Student history: the student's own recorded results, newest first.
/// Scores stay hidden until the teacher publishes them.
pub async fn history(
    State(state): State<AppState>,
    Path(student_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let results = state.services.results.results_for_student(student_id).await?;
    let entries: Vec<HistoryEntry> = results.iter().map(HistoryEntry::from).collect();

    Ok(Json(entries))
}

/// Flips the published flag on every result of a quiz, gating whether
/// students may see their scores.
pub async fn publish(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<PublishRequest>,
) -> Result<impl IntoResponse, AppError> {
    let affected = state
        .services
        .results
        .publish_quiz_results(quiz_id, payload.published)
        .await?;

    Ok(Json(json!({
        "published": payload.published,
        "affected": affected,
    })))
}
