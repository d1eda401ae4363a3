// src/handlers/quiz.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sqlx::types::Json as SqlJson;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        class::{EnrollRequest, Enrollment},
        quiz::{CreateQuizRequest, Quiz, QuizSummary},
    },
    state::AppState,
    utils::code::generate_room_code,
};

const CODE_ALLOCATION_ATTEMPTS: usize = 5;

/// Creates a new quiz and allocates a unique room code for it.
///
/// Validates the authoring constraints (four options per question, the
/// answer present among them, positive points summing to at most 100)
/// before anything is stored.
pub async fn create_quiz(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    // Codes are random over a 32-character alphabet; collisions are rare
    // enough that a short retry loop suffices.
    let mut code = generate_room_code();
    let mut attempts = 0;
    while state
        .services
        .directory
        .find_quiz_by_code(&code)
        .await?
        .is_some()
    {
        attempts += 1;
        if attempts >= CODE_ALLOCATION_ATTEMPTS {
            return Err(AppError::InternalServerError(
                "Could not allocate a unique room code".to_string(),
            ));
        }
        code = generate_room_code();
    }

    let eligible_classes: Vec<String> = payload
        .eligible_classes
        .iter()
        .map(|c| c.to_uppercase())
        .collect();

    let quiz = Quiz {
        id: Uuid::new_v4(),
        title: payload.title,
        code,
        teacher_name: payload.teacher_name,
        questions: SqlJson(payload.questions),
        eligible_classes: SqlJson(eligible_classes),
        created_at: Some(chrono::Utc::now()),
    };

    state.services.directory.insert_quiz(&quiz).await?;

    tracing::info!("Created quiz '{}' with code {}", quiz.title, quiz.code);

    Ok((StatusCode::CREATED, Json(QuizSummary::from(&quiz))))
}

/// Lists all quizzes with answers stripped.
pub async fn list_quizzes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let quizzes = state.services.directory.list_quizzes().await?;
    let summaries: Vec<QuizSummary> = quizzes.iter().map(QuizSummary::from).collect();

    Ok(Json(summaries))
}

/// Enrolls a student into a class. Class names follow the grade+section
/// format (e.g. "10A") and are normalized to uppercase.
pub async fn enroll(
    State(state): State<AppState>,
    Json(payload): Json<EnrollRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let enrollment = Enrollment {
        student_id: payload.student_id,
        student_name: payload.student_name,
        class_name: payload.class_name.to_uppercase(),
        created_at: Some(chrono::Utc::now()),
    };

    state.services.registry.enroll(&enrollment).await?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}
