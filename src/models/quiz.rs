// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

use crate::utils::code::is_valid_classroom;

/// Every question carries exactly four options, labelled A-D by position.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Authoring-side cap: the point values of a quiz must sum to at most 100.
pub const MAX_QUIZ_POINTS: f64 = 100.0;

/// A single quiz question.
///
/// The correct answer is stored as the literal option string, not an index,
/// and grading is a strict string comparison against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,

    /// Option order is significant: it defines the displayed labels A-D.
    pub options: Vec<String>,

    /// The correct option, verbatim.
    pub answer: String,

    /// Points awarded for a correct answer.
    pub points: f64,
}

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,

    pub title: String,

    /// 6-character room code students join with. Stored uppercase, unique.
    pub code: String,

    pub teacher_name: String,

    /// Ordered question list, stored as a JSON array in the database.
    pub questions: Json<Vec<Question>>,

    /// Class names this quiz is restricted to. Empty means open to all.
    pub eligible_classes: Json<Vec<String>>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Quiz {
    pub fn is_restricted(&self) -> bool {
        !self.eligible_classes.is_empty()
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

/// DTO for sending a question to a student mid-session (excludes the answer).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub points: f64,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            prompt: q.prompt.clone(),
            options: q.options.clone(),
            points: q.points,
        }
    }
}

/// DTO for listing quizzes without exposing answers.
#[derive(Debug, Serialize)]
pub struct QuizSummary {
    pub id: Uuid,
    pub title: String,
    pub code: String,
    pub teacher_name: String,
    pub question_count: usize,
    pub eligible_classes: Vec<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            code: quiz.code.clone(),
            teacher_name: quiz.teacher_name.clone(),
            question_count: quiz.question_count(),
            eligible_classes: quiz.eligible_classes.to_vec(),
            created_at: quiz.created_at,
        }
    }
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 100))]
    pub teacher_name: String,

    #[validate(custom(function = validate_questions))]
    pub questions: Vec<Question>,

    /// Class names the quiz is restricted to; empty or omitted = open quiz.
    #[serde(default)]
    #[validate(custom(function = validate_eligible_classes))]
    pub eligible_classes: Vec<String>,
}

fn validate_questions(questions: &[Question]) -> Result<(), validator::ValidationError> {
    if questions.is_empty() {
        return Err(validator::ValidationError::new("no_questions"));
    }

    let mut total_points = 0.0;
    for q in questions {
        if q.prompt.trim().is_empty() {
            return Err(validator::ValidationError::new("empty_prompt"));
        }
        if q.options.len() != OPTIONS_PER_QUESTION {
            return Err(validator::ValidationError::new("need_four_options"));
        }
        if q.options.iter().any(|o| o.trim().is_empty()) {
            return Err(validator::ValidationError::new("empty_option"));
        }
        if !q.options.contains(&q.answer) {
            return Err(validator::ValidationError::new("answer_not_an_option"));
        }
        if q.points <= 0.0 {
            return Err(validator::ValidationError::new("points_not_positive"));
        }
        total_points += q.points;
    }

    if total_points > MAX_QUIZ_POINTS {
        return Err(validator::ValidationError::new("points_exceed_100"));
    }

    Ok(())
}

fn validate_eligible_classes(classes: &[String]) -> Result<(), validator::ValidationError> {
    for name in classes {
        if !is_valid_classroom(name) {
            return Err(validator::ValidationError::new("invalid_classroom_format"));
        }
    }
    Ok(())
}
