// src/handlers/session.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::PublicQuestion,
    session::{
        controller::{AdvanceOutcome, QuizSession},
        monitor::AttentionSignal,
    },
    state::AppState,
    utils::code::normalize_room_code,
};

/// DTO for joining a quiz by room code.
#[derive(Debug, Deserialize, Validate)]
pub struct JoinRequest {
    #[validate(length(min = 1, max = 16))]
    pub room_code: String,

    pub student_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub student_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassContextRequest {
    pub class_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Deserialize)]
pub struct AttentionRequest {
    pub signal: AttentionSignal,
}

/// Starts a quiz attempt from a room code.
///
/// Checks run in order: code lookup (404), class eligibility (403),
/// prior result (409). On success a server-side session is created at
/// question 0 and the first question is returned with the answer
/// stripped. `class_options` is non-empty when the student still has to
/// choose which class to attend under.
pub async fn join(
    State(state): State<AppState>,
    Json(payload): Json<JoinRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let code = normalize_room_code(&payload.room_code);

    let quiz = state
        .services
        .directory
        .find_quiz_by_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No quiz found for code '{}'", code)))?;

    let student_classes = state
        .services
        .registry
        .classes_for_student(payload.student_id)
        .await?;

    let quiz_id = quiz.id;
    let session = QuizSession::start(
        quiz,
        payload.student_id,
        payload.student_name,
        &student_classes,
    )?;

    // Hard, one-shot gate: a recorded result means no retake, ever. The
    // result store's unique index backs this check up at write time.
    if state
        .services
        .results
        .has_result(payload.student_id, quiz_id)
        .await?
    {
        return Err(AppError::AlreadyCompleted(
            "You have already completed this quiz".to_string(),
        ));
    }

    let body = json!({
        "session_id": session.id(),
        "quiz_title": session.quiz().title,
        "question_count": session.quiz().question_count(),
        "class_options": session.class_options(),
        "class_context": session.class_context(),
        "question_index": session.current_index(),
        "question": PublicQuestion::from(session.current_question()),
    });

    state.sessions.insert(session);

    Ok((StatusCode::CREATED, Json(body)))
}

/// Fixes the class the attempt is recorded under.
/// Only needed when `join` returned more than one class option.
pub async fn select_class(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<ClassContextRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.sessions.get(session_id)?;
    let mut session = entry.lock().await;

    session.select_class_context(&payload.class_name)?;

    Ok(Json(json!({
        "class_context": session.class_context(),
    })))
}

/// Records the candidate answer for the current question. Repeatable
/// until the question is advanced past.
pub async fn select_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.sessions.get(session_id)?;
    let mut session = entry.lock().await;

    session.select_answer(payload.answer)?;

    Ok(Json(json!({
        "question_index": session.current_index(),
    })))
}

/// Scores the current question and moves to the next, or finishes the
/// quiz and records the result.
///
/// The final write is deliberately fire-and-forget: a storage failure is
/// logged but the student still sees the finished state and their local
/// score.
pub async fn advance(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.sessions.get(session_id)?;
    let mut session = entry.lock().await;

    match session.advance()? {
        AdvanceOutcome::InProgress { next_index } => Ok(Json(json!({
            "finished": false,
            "question_index": next_index,
            "question": PublicQuestion::from(session.current_question()),
        }))),
        AdvanceOutcome::Finished { result } => {
            match state.services.results.save_result(&result).await {
                Ok(true) => {
                    tracing::info!(
                        "Recorded result: quiz {} student {} score {}",
                        result.quiz_id,
                        result.student_id,
                        result.score
                    );
                }
                Ok(false) => {
                    tracing::warn!(
                        "Result for quiz {} student {} already existed, submission dropped",
                        result.quiz_id,
                        result.student_id
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to persist result for quiz {} student {}: {}",
                        result.quiz_id,
                        result.student_id,
                        e
                    );
                }
            }

            // The session is terminal; drop it from the table. A tombstone
            // keeps late calls answering "already finished" instead of
            // "not found".
            state.sessions.finish(session_id);

            Ok(Json(json!({
                "finished": true,
                "score": result.score,
                "quiz_title": result.quiz_title,
            })))
        }
    }
}

/// Feeds a page-visibility or window-focus transition to the session's
/// anti-cheat monitor. Returns the alarm state the client must reflect
/// and whether to show a warning notification.
pub async fn attention(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(payload): Json<AttentionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let entry = match state.sessions.get(session_id) {
        Ok(entry) => entry,
        // Signals on a finished (and since discarded) session have no
        // effect; the alarm was already forced off at the finish.
        Err(AppError::SessionAlreadyFinished) => {
            return Ok(Json(json!({
                "alarm_on": false,
                "warn": false,
            })));
        }
        Err(e) => return Err(e),
    };
    let mut session = entry.lock().await;

    let update = session.attention(payload.signal);

    Ok(Json(json!({
        "alarm_on": update.alarm_on,
        "warn": update.warn,
    })))
}
