use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A student's registration in a course; owns the aggregate progress percentage.
/// Invariant: completed_at is non-null iff progress_percentage == 100.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_percentage: i32,
}

/// Enrollment row joined with its course summary for the student dashboard
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrollmentWithCourse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress_percentage: i32,
    pub course_title: String,
    pub course_thumbnail_url: Option<String>,
    pub teacher_name: Option<String>,
    pub category_name: Option<String>,
}
