//! PostgreSQL-backed implementations of the progress store traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::services::progress::{
    ContentStore, EnrollmentRecord, EnrollmentStore, LessonProgressRecord, StoreError,
};

#[derive(Clone)]
pub struct PgEnrollmentStore {
    pool: PgPool,
}

impl PgEnrollmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    async fn find_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> Result<Option<EnrollmentRecord>, StoreError> {
        let row: Option<(Uuid, i32, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT id, progress_percentage, completed_at
             FROM enrollments
             WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, progress_percentage, completed_at)| EnrollmentRecord {
            id,
            progress_percentage,
            completed_at,
        }))
    }

    async fn update_enrollment_progress(
        &self,
        enrollment_id: Uuid,
        progress_percentage: i32,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE enrollments
             SET progress_percentage = $2, completed_at = $3
             WHERE id = $1",
        )
        .bind(enrollment_id)
        .bind(progress_percentage)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn lesson_ids_for_course(&self, course_id: Uuid) -> Result<Vec<Uuid>, StoreError> {
        let ids: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT l.id
             FROM lessons l
             JOIN modules m ON l.module_id = m.id
             WHERE m.course_id = $1",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn find_lesson_progress(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<Option<LessonProgressRecord>, StoreError> {
        let row: Option<(Uuid, bool, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT id, completed, completed_at
             FROM lesson_progress
             WHERE enrollment_id = $1 AND lesson_id = $2",
        )
        .bind(enrollment_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, completed, completed_at)| LessonProgressRecord {
            id,
            completed,
            completed_at,
        }))
    }

    async fn insert_lesson_progress(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO lesson_progress (enrollment_id, lesson_id, completed, completed_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(enrollment_id)
        .bind(lesson_id)
        .bind(completed)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_lesson_progress(
        &self,
        progress_id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE lesson_progress
             SET completed = $2, completed_at = $3
             WHERE id = $1",
        )
        .bind(progress_id)
        .bind(completed)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_completed_lessons(&self, enrollment_id: Uuid) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*)
             FROM lesson_progress
             WHERE enrollment_id = $1 AND completed = true",
        )
        .bind(enrollment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

/// Progress tracker wired to the application database
pub type PgProgressTracker =
    crate::services::progress::ProgressTracker<PgEnrollmentStore, PgContentStore>;

pub fn progress_tracker(pool: PgPool) -> PgProgressTracker {
    crate::services::progress::ProgressTracker::new(
        PgEnrollmentStore::new(pool.clone()),
        PgContentStore::new(pool),
    )
}
