// src/services/memory.rs

use std::collections::BTreeSet;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{class::Enrollment, quiz::Quiz, result::QuizResult},
    services::{ClassRegistry, QuizDirectory, ResultStore},
};

/// In-memory implementation of all three collaborator traits.
///
/// Backs database-less runs and the integration tests. Plain vectors
/// behind RwLocks are plenty at this scale; the result-store write lock
/// makes the insert-if-absent check atomic, matching the Postgres
/// backend's unique-index behavior.
#[derive(Default)]
pub struct MemoryStore {
    quizzes: RwLock<Vec<Quiz>>,
    results: RwLock<Vec<QuizResult>>,
    enrollments: RwLock<Vec<Enrollment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error() -> AppError {
    AppError::InternalServerError("In-memory store lock poisoned".to_string())
}

#[async_trait]
impl QuizDirectory for MemoryStore {
    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<Quiz>, AppError> {
        let quizzes = self.quizzes.read().map_err(|_| lock_error())?;
        Ok(quizzes.iter().find(|q| q.code == code).cloned())
    }

    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), AppError> {
        let mut quizzes = self.quizzes.write().map_err(|_| lock_error())?;
        if quizzes.iter().any(|q| q.code == quiz.code) {
            return Err(AppError::InternalServerError(format!(
                "Duplicate room code '{}'",
                quiz.code
            )));
        }
        quizzes.push(quiz.clone());
        Ok(())
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, AppError> {
        let quizzes = self.quizzes.read().map_err(|_| lock_error())?;
        Ok(quizzes.clone())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn has_result(&self, student_id: Uuid, quiz_id: Uuid) -> Result<bool, AppError> {
        let results = self.results.read().map_err(|_| lock_error())?;
        Ok(results
            .iter()
            .any(|r| r.student_id == student_id && r.quiz_id == quiz_id))
    }

    async fn save_result(&self, result: &QuizResult) -> Result<bool, AppError> {
        let mut results = self.results.write().map_err(|_| lock_error())?;
        let exists = results
            .iter()
            .any(|r| r.student_id == result.student_id && r.quiz_id == result.quiz_id);
        if exists {
            return Ok(false);
        }
        results.push(result.clone());
        Ok(true)
    }

    async fn results_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<QuizResult>, AppError> {
        let results = self.results.read().map_err(|_| lock_error())?;
        let mut rows: Vec<QuizResult> = results
            .iter()
            .filter(|r| r.quiz_id == quiz_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(rows)
    }

    async fn results_for_student(&self, student_id: Uuid) -> Result<Vec<QuizResult>, AppError> {
        let results = self.results.read().map_err(|_| lock_error())?;
        let mut rows: Vec<QuizResult> = results
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(rows)
    }

    async fn publish_quiz_results(&self, quiz_id: Uuid, published: bool) -> Result<u64, AppError> {
        let mut results = self.results.write().map_err(|_| lock_error())?;
        let mut affected = 0;
        for r in results.iter_mut().filter(|r| r.quiz_id == quiz_id) {
            r.published = published;
            affected += 1;
        }
        Ok(affected)
    }
}

#[async_trait]
impl ClassRegistry for MemoryStore {
    async fn classes_for_student(&self, student_id: Uuid) -> Result<BTreeSet<String>, AppError> {
        let enrollments = self.enrollments.read().map_err(|_| lock_error())?;
        Ok(enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .map(|e| e.class_name.clone())
            .collect())
    }

    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), AppError> {
        let mut enrollments = self.enrollments.write().map_err(|_| lock_error())?;
        let exists = enrollments
            .iter()
            .any(|e| e.student_id == enrollment.student_id && e.class_name == enrollment.class_name);
        if !exists {
            enrollments.push(enrollment.clone());
        }
        Ok(())
    }
}
