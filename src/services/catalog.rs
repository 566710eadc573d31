use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::category::Category;
use crate::database::models::course::{Course, CourseSummary, DifficultyLevel};
use crate::database::models::profile::Role;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("caller does not own this course")]
    NotCourseOwner,

    #[error("teacher role required")]
    TeacherRoleRequired,

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Deserialize)]
pub struct CourseInput {
    pub title: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub difficulty_level: Option<String>,
    pub thumbnail_url: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseFilters {
    /// Case-insensitive match against title or description
    pub search: Option<String>,
    pub category: Option<Uuid>,
    pub difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TeacherStats {
    pub total_courses: i64,
    pub published_courses: i64,
    pub total_students: i64,
}

const SUMMARY_SELECT: &str = "
    SELECT c.id, c.teacher_id, c.title, c.description, c.category_id,
           c.difficulty_level, c.thumbnail_url, c.price, c.is_published,
           c.created_at, c.updated_at,
           p.full_name AS teacher_name,
           cat.name AS category_name,
           (SELECT AVG(r.rating)::float8 FROM reviews r WHERE r.course_id = c.id) AS avg_rating,
           (SELECT COUNT(*) FROM reviews r WHERE r.course_id = c.id) AS total_reviews,
           (SELECT COUNT(*) FROM enrollments e WHERE e.course_id = c.id) AS total_enrollments
    FROM courses c
    JOIN profiles p ON p.id = c.teacher_id
    LEFT JOIN categories cat ON cat.id = c.category_id";

pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let categories: Vec<Category> =
            sqlx::query_as("SELECT id, name, description, created_at FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    /// Published courses for the student catalog, with optional filters
    pub async fn list_published(
        &self,
        filters: &CourseFilters,
    ) -> Result<Vec<CourseSummary>, CatalogError> {
        if let Some(difficulty) = &filters.difficulty {
            difficulty
                .parse::<DifficultyLevel>()
                .map_err(CatalogError::Validation)?;
        }

        let sql = format!(
            "{SUMMARY_SELECT}
             WHERE c.is_published = true
               AND ($1::text IS NULL OR c.title ILIKE '%' || $1 || '%'
                                     OR c.description ILIKE '%' || $1 || '%')
               AND ($2::uuid IS NULL OR c.category_id = $2)
               AND ($3::text IS NULL OR c.difficulty_level = $3)
             ORDER BY c.created_at DESC"
        );

        let courses: Vec<CourseSummary> = sqlx::query_as(&sql)
            .bind(&filters.search)
            .bind(filters.category)
            .bind(&filters.difficulty)
            .fetch_all(&self.pool)
            .await?;

        Ok(courses)
    }

    /// All of a teacher's courses, published or not
    pub async fn list_for_teacher(
        &self,
        teacher_id: Uuid,
    ) -> Result<Vec<CourseSummary>, CatalogError> {
        let sql = format!(
            "{SUMMARY_SELECT}
             WHERE c.teacher_id = $1
             ORDER BY c.created_at DESC"
        );

        let courses: Vec<CourseSummary> = sqlx::query_as(&sql)
            .bind(teacher_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(courses)
    }

    pub async fn get_course(&self, course_id: Uuid) -> Result<CourseSummary, CatalogError> {
        let sql = format!("{SUMMARY_SELECT} WHERE c.id = $1");

        let course: Option<CourseSummary> = sqlx::query_as(&sql)
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        course.ok_or(CatalogError::CourseNotFound(course_id))
    }

    pub async fn create_course(
        &self,
        teacher_id: Uuid,
        role: Role,
        input: CourseInput,
    ) -> Result<Course, CatalogError> {
        if role != Role::Teacher {
            return Err(CatalogError::TeacherRoleRequired);
        }
        Self::validate_input(&input)?;

        let course: Course = sqlx::query_as(
            "INSERT INTO courses (teacher_id, title, description, category_id,
                                  difficulty_level, thumbnail_url, price)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, 0))
             RETURNING id, teacher_id, title, description, category_id, difficulty_level,
                       thumbnail_url, price, is_published, created_at, updated_at",
        )
        .bind(teacher_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.category_id)
        .bind(&input.difficulty_level)
        .bind(&input.thumbnail_url)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(course_id = %course.id, %teacher_id, "created course");
        Ok(course)
    }

    pub async fn update_course(
        &self,
        teacher_id: Uuid,
        course_id: Uuid,
        input: CourseInput,
    ) -> Result<Course, CatalogError> {
        Self::validate_input(&input)?;
        self.assert_owner(teacher_id, course_id).await?;

        let course: Course = sqlx::query_as(
            "UPDATE courses
             SET title = $2, description = $3, category_id = $4, difficulty_level = $5,
                 thumbnail_url = $6, price = COALESCE($7, price), updated_at = now()
             WHERE id = $1
             RETURNING id, teacher_id, title, description, category_id, difficulty_level,
                       thumbnail_url, price, is_published, created_at, updated_at",
        )
        .bind(course_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.category_id)
        .bind(&input.difficulty_level)
        .bind(&input.thumbnail_url)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await?;

        Ok(course)
    }

    /// Flip the publish flag; hides or exposes the course in the catalog
    pub async fn toggle_publish(
        &self,
        teacher_id: Uuid,
        course_id: Uuid,
    ) -> Result<Course, CatalogError> {
        self.assert_owner(teacher_id, course_id).await?;

        let course: Course = sqlx::query_as(
            "UPDATE courses
             SET is_published = NOT is_published, updated_at = now()
             WHERE id = $1
             RETURNING id, teacher_id, title, description, category_id, difficulty_level,
                       thumbnail_url, price, is_published, created_at, updated_at",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            course_id = %course.id,
            is_published = course.is_published,
            "toggled course publish state"
        );
        Ok(course)
    }

    /// Delete a course; modules, lessons, enrollments, and reviews cascade
    pub async fn delete_course(
        &self,
        teacher_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), CatalogError> {
        self.assert_owner(teacher_id, course_id).await?;

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(%course_id, "deleted course");
        Ok(())
    }

    /// Dashboard counters for a teacher's courses
    pub async fn teacher_stats(&self, teacher_id: Uuid) -> Result<TeacherStats, CatalogError> {
        let (total_courses, published_courses): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE is_published)
             FROM courses
             WHERE teacher_id = $1",
        )
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await?;

        let total_students: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             WHERE c.teacher_id = $1",
        )
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TeacherStats {
            total_courses,
            published_courses,
            total_students,
        })
    }

    async fn assert_owner(&self, teacher_id: Uuid, course_id: Uuid) -> Result<(), CatalogError> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT teacher_id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        match owner {
            None => Err(CatalogError::CourseNotFound(course_id)),
            Some(owner) if owner != teacher_id => Err(CatalogError::NotCourseOwner),
            Some(_) => Ok(()),
        }
    }

    fn validate_input(input: &CourseInput) -> Result<(), CatalogError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(CatalogError::Validation("Course title is required".to_string()));
        }
        if title.len() > 200 {
            return Err(CatalogError::Validation(
                "Course title must be at most 200 characters".to_string(),
            ));
        }
        if let Some(difficulty) = &input.difficulty_level {
            difficulty
                .parse::<DifficultyLevel>()
                .map_err(CatalogError::Validation)?;
        }
        if let Some(price) = input.price {
            if price < Decimal::ZERO {
                return Err(CatalogError::Validation("Price cannot be negative".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str) -> CourseInput {
        CourseInput {
            title: title.to_string(),
            description: None,
            category_id: None,
            difficulty_level: None,
            thumbnail_url: None,
            price: None,
        }
    }

    #[test]
    fn test_title_validation() {
        assert!(CatalogService::validate_input(&input("Intro to Rust")).is_ok());
        assert!(CatalogService::validate_input(&input("")).is_err());
        assert!(CatalogService::validate_input(&input("   ")).is_err());
        assert!(CatalogService::validate_input(&input(&"x".repeat(201))).is_err());
    }

    #[test]
    fn test_difficulty_validation() {
        let mut course = input("Intro to Rust");
        course.difficulty_level = Some("beginner".to_string());
        assert!(CatalogService::validate_input(&course).is_ok());

        course.difficulty_level = Some("impossible".to_string());
        assert!(CatalogService::validate_input(&course).is_err());
    }

    #[test]
    fn test_price_validation() {
        let mut course = input("Intro to Rust");
        course.price = Some(Decimal::new(4999, 2));
        assert!(CatalogService::validate_input(&course).is_ok());

        course.price = Some(Decimal::new(-1, 0));
        assert!(CatalogService::validate_input(&course).is_err());
    }
}
