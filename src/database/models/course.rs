use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Course difficulty, stored as lowercase text in the courses table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(format!("invalid difficulty level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub difficulty_level: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price: Decimal,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course row as shown in catalog listings, joined with teacher/category names
/// and review/enrollment aggregates
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CourseSummary {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub difficulty_level: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price: Decimal,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub teacher_name: Option<String>,
    pub category_name: Option<String>,
    pub avg_rating: Option<f64>,
    pub total_reviews: i64,
    pub total_enrollments: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(
            "beginner".parse::<DifficultyLevel>().unwrap(),
            DifficultyLevel::Beginner
        );
        assert_eq!(
            "advanced".parse::<DifficultyLevel>().unwrap(),
            DifficultyLevel::Advanced
        );
        assert!("expert".parse::<DifficultyLevel>().is_err());
    }
}
