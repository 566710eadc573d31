use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lesson {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub duration_minutes: i32,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
}
