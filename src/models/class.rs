// src/models/class.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::code::is_valid_classroom;

/// Represents the 'enrollments' table in the database.
/// One row per (student, class) membership.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: Uuid,
    pub student_name: String,
    pub class_name: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for enrolling a student into a class.
#[derive(Debug, Deserialize, Validate)]
pub struct EnrollRequest {
    pub student_id: Uuid,

    #[validate(length(min = 1, max = 100))]
    pub student_name: String,

    #[validate(custom(function = validate_class_name))]
    pub class_name: String,
}

fn validate_class_name(name: &str) -> Result<(), validator::ValidationError> {
    if !is_valid_classroom(name) {
        return Err(validator::ValidationError::new("invalid_classroom_format"));
    }
    Ok(())
}
