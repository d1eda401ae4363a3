// src/models/result.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the 'results' table in the database.
/// Stores the outcome of one completed quiz attempt. At most one row exists
/// per (student, quiz) pair; the store enforces this with a unique index.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub quiz_code: String,
    pub quiz_title: String,
    pub student_id: Uuid,
    pub student_name: String,

    /// The class the student attended under, or "general" for open quizzes.
    pub class_context: String,

    /// Final score, clamped to at most 100.
    pub score: f64,

    /// Teacher-controlled gate on whether the student may see the score.
    pub published: bool,

    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// Teacher-facing gradebook row for one quiz.
#[derive(Debug, Serialize, FromRow)]
pub struct GradebookEntry {
    pub student_name: String,
    pub class_context: String,
    pub score: f64,
    pub published: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl From<&QuizResult> for GradebookEntry {
    fn from(r: &QuizResult) -> Self {
        Self {
            student_name: r.student_name.clone(),
            class_context: r.class_context.clone(),
            score: r.score,
            published: r.published,
            submitted_at: r.submitted_at,
        }
    }
}

/// Student-facing history row. The score is withheld until the teacher
/// publishes the result.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub quiz_title: String,
    pub quiz_code: String,
    pub score: Option<f64>,
    pub published: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl From<&QuizResult> for HistoryEntry {
    fn from(r: &QuizResult) -> Self {
        Self {
            quiz_title: r.quiz_title.clone(),
            quiz_code: r.quiz_code.clone(),
            score: r.published.then_some(r.score),
            published: r.published,
            submitted_at: r.submitted_at,
        }
    }
}
