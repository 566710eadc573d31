use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An ordered grouping of lessons within a course
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}
