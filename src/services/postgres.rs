// src/services/postgres.rs

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{class::Enrollment, quiz::Quiz, result::QuizResult},
    services::{ClassRegistry, QuizDirectory, ResultStore},
};

/// Postgres implementation of all three collaborator traits, sharing one
/// connection pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizDirectory for PgStore {
    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<Quiz>, AppError> {
        let quiz = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, code, teacher_name, questions, eligible_classes, created_at
            FROM quizzes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to look up room code '{}': {:?}", code, e);
            AppError::from(e)
        })?;

        Ok(quiz)
    }

    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO quizzes (id, title, code, teacher_name, questions, eligible_classes)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(quiz.id)
        .bind(&quiz.title)
        .bind(&quiz.code)
        .bind(&quiz.teacher_name)
        .bind(&quiz.questions)
        .bind(&quiz.eligible_classes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, AppError> {
        let quizzes = sqlx::query_as::<_, Quiz>(
            r#"
            SELECT id, title, code, teacher_name, questions, eligible_classes, created_at
            FROM quizzes
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(quizzes)
    }
}

#[async_trait]
impl ResultStore for PgStore {
    async fn has_result(&self, student_id: Uuid, quiz_id: Uuid) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM results WHERE student_id = $1 AND quiz_id = $2
            )
            "#,
        )
        .bind(student_id)
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn save_result(&self, result: &QuizResult) -> Result<bool, AppError> {
        // The unique index on (student_id, quiz_id) makes this the single
        // atomic duplicate gate; a concurrent duplicate insert is a no-op.
        let outcome = sqlx::query(
            r#"
            INSERT INTO results
                (id, quiz_id, quiz_code, quiz_title, student_id, student_name,
                 class_context, score, published, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (student_id, quiz_id) DO NOTHING
            "#,
        )
        .bind(result.id)
        .bind(result.quiz_id)
        .bind(&result.quiz_code)
        .bind(&result.quiz_title)
        .bind(result.student_id)
        .bind(&result.student_name)
        .bind(&result.class_context)
        .bind(result.score)
        .bind(result.published)
        .bind(result.submitted_at)
        .execute(&self.pool)
        .await?;

        Ok(outcome.rows_affected() == 1)
    }

    async fn results_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<QuizResult>, AppError> {
        let rows = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT id, quiz_id, quiz_code, quiz_title, student_id, student_name,
                   class_context, score, published, submitted_at
            FROM results
            WHERE quiz_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn results_for_student(&self, student_id: Uuid) -> Result<Vec<QuizResult>, AppError> {
        let rows = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT id, quiz_id, quiz_code, quiz_title, student_id, student_name,
                   class_context, score, published, submitted_at
            FROM results
            WHERE student_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn publish_quiz_results(&self, quiz_id: Uuid, published: bool) -> Result<u64, AppError> {
        let outcome = sqlx::query(
            r#"
            UPDATE results SET published = $2 WHERE quiz_id = $1
            "#,
        )
        .bind(quiz_id)
        .bind(published)
        .execute(&self.pool)
        .await?;

        Ok(outcome.rows_affected())
    }
}

#[async_trait]
impl ClassRegistry for PgStore {
    async fn classes_for_student(&self, student_id: Uuid) -> Result<BTreeSet<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT class_name FROM enrollments WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names.into_iter().collect())
    }

    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO enrollments (student_id, student_name, class_name)
            VALUES ($1, $2, $3)
            ON CONFLICT (student_id, class_name) DO NOTHING
            "#,
        )
        .bind(enrollment.student_id)
        .bind(&enrollment.student_name)
        .bind(&enrollment.class_name)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
