// src/services/mod.rs

pub mod memory;
pub mod postgres;

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{class::Enrollment, quiz::Quiz, result::QuizResult},
};

/// Room-code directory and quiz storage.
#[async_trait]
pub trait QuizDirectory: Send + Sync {
    /// Resolves a normalized (uppercase) room code to a quiz, if any.
    async fn find_quiz_by_code(&self, code: &str) -> Result<Option<Quiz>, AppError>;

    async fn insert_quiz(&self, quiz: &Quiz) -> Result<(), AppError>;

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, AppError>;
}

/// At-most-once result recording and review.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn has_result(&self, student_id: Uuid, quiz_id: Uuid) -> Result<bool, AppError>;

    /// Atomic insert-if-absent: returns whether the record was actually
    /// written. A concurrent duplicate loses silently instead of racing
    /// past a separate existence check.
    async fn save_result(&self, result: &QuizResult) -> Result<bool, AppError>;

    async fn results_for_quiz(&self, quiz_id: Uuid) -> Result<Vec<QuizResult>, AppError>;

    async fn results_for_student(&self, student_id: Uuid) -> Result<Vec<QuizResult>, AppError>;

    /// Flips the published flag on every result of a quiz. Returns the
    /// number of affected records.
    async fn publish_quiz_results(&self, quiz_id: Uuid, published: bool) -> Result<u64, AppError>;
}

/// Student class memberships.
#[async_trait]
pub trait ClassRegistry: Send + Sync {
    async fn classes_for_student(&self, student_id: Uuid) -> Result<BTreeSet<String>, AppError>;

    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), AppError>;
}

/// The collaborator implementations the application is wired with,
/// selected once at startup.
#[derive(Clone)]
pub struct Services {
    pub directory: Arc<dyn QuizDirectory>,
    pub results: Arc<dyn ResultStore>,
    pub registry: Arc<dyn ClassRegistry>,
}

impl Services {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));
        Self {
            directory: store.clone(),
            results: store.clone(),
            registry: store,
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            directory: store.clone(),
            results: store.clone(),
            registry: store,
        }
    }
}
