use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::profile::Role;
use crate::database::models::review::{Review, ReviewWithStudent};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("student is not enrolled in this course")]
    NotEnrolled,

    #[error("student role required")]
    StudentRoleRequired,

    #[error("course already reviewed by this student")]
    AlreadyReviewed,

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Reviews for a course plus the aggregate shown next to them
#[derive(Debug, Serialize)]
pub struct CourseReviews {
    pub reviews: Vec<ReviewWithStudent>,
    pub avg_rating: Option<f64>,
    pub total_reviews: i64,
}

pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a review; only enrolled students may review, one review per
    /// (course, student)
    pub async fn create_review(
        &self,
        student_id: Uuid,
        role: Role,
        course_id: Uuid,
        rating: i32,
        comment: Option<String>,
    ) -> Result<Review, ReviewError> {
        Self::assert_student(role)?;
        Self::validate_rating(rating)?;

        let course_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
                .bind(course_id)
                .fetch_one(&self.pool)
                .await?;
        if !course_exists {
            return Err(ReviewError::CourseNotFound(course_id));
        }

        let enrolled: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        if !enrolled {
            return Err(ReviewError::NotEnrolled);
        }

        let reviewed: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        if reviewed {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review: Review = sqlx::query_as(
            "INSERT INTO reviews (course_id, student_id, rating, comment)
             VALUES ($1, $2, $3, $4)
             RETURNING id, course_id, student_id, rating, comment, created_at",
        )
        .bind(course_id)
        .bind(student_id)
        .bind(rating)
        .bind(&comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    /// Reviews newest-first with reviewer names and the course's average rating
    pub async fn list_for_course(&self, course_id: Uuid) -> Result<CourseReviews, ReviewError> {
        let reviews: Vec<ReviewWithStudent> = sqlx::query_as(
            "SELECT r.id, r.course_id, r.student_id, r.rating, r.comment, r.created_at,
                    p.full_name AS student_name
             FROM reviews r
             JOIN profiles p ON p.id = r.student_id
             WHERE r.course_id = $1
             ORDER BY r.created_at DESC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let total_reviews = reviews.len() as i64;
        let avg_rating = if reviews.is_empty() {
            None
        } else {
            Some(reviews.iter().map(|r| r.rating as f64).sum::<f64>() / total_reviews as f64)
        };

        Ok(CourseReviews {
            reviews,
            avg_rating,
            total_reviews,
        })
    }

    fn validate_rating(rating: i32) -> Result<(), ReviewError> {
        if !(1..=5).contains(&rating) {
            return Err(ReviewError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
        Ok(())
    }

    fn assert_student(role: Role) -> Result<(), ReviewError> {
        if role != Role::Student {
            return Err(ReviewError::StudentRoleRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_validation() {
        for rating in 1..=5 {
            assert!(ReviewService::validate_rating(rating).is_ok());
        }
        assert!(ReviewService::validate_rating(0).is_err());
        assert!(ReviewService::validate_rating(6).is_err());
        assert!(ReviewService::validate_rating(-1).is_err());
    }

    #[test]
    fn test_only_students_may_review() {
        assert!(ReviewService::assert_student(Role::Student).is_ok());
        assert!(matches!(
            ReviewService::assert_student(Role::Teacher),
            Err(ReviewError::StudentRoleRequired)
        ));
    }
}
