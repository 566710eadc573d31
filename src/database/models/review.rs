use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Review joined with the reviewer's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReviewWithStudent {
    pub id: Uuid,
    pub course_id: Uuid,
    pub student_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub student_name: Option<String>,
}
