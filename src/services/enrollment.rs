use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::enrollment::{Enrollment, EnrollmentWithCourse};
use crate::database::models::profile::Role;

#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("enrollment not found: {0}")]
    EnrollmentNotFound(Uuid),

    #[error("already enrolled")]
    AlreadyEnrolled,

    #[error("student role required")]
    StudentRoleRequired,

    #[error("enrollment belongs to another student")]
    NotEnrollmentOwner,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub struct EnrollmentService {
    pool: PgPool,
}

impl EnrollmentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enroll a student in a published course. Unpublished courses are not
    /// visible to students, so they read as not found here.
    pub async fn enroll(
        &self,
        student_id: Uuid,
        role: Role,
        course_id: Uuid,
    ) -> Result<Enrollment, EnrollmentError> {
        Self::assert_student(role)?;

        let published: Option<bool> =
            sqlx::query_scalar("SELECT is_published FROM courses WHERE id = $1")
                .bind(course_id)
                .fetch_optional(&self.pool)
                .await?;
        if !published.unwrap_or(false) {
            return Err(EnrollmentError::CourseNotFound(course_id));
        }

        let existing: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;
        if existing {
            return Err(EnrollmentError::AlreadyEnrolled);
        }

        let enrollment: Enrollment = sqlx::query_as(
            "INSERT INTO enrollments (student_id, course_id)
             VALUES ($1, $2)
             RETURNING id, student_id, course_id, enrolled_at, completed_at, progress_percentage",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(enrollment_id = %enrollment.id, %student_id, %course_id, "enrolled student");
        Ok(enrollment)
    }

    /// The student's enrollments with course summary, newest first
    pub async fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<EnrollmentWithCourse>, EnrollmentError> {
        let enrollments: Vec<EnrollmentWithCourse> = sqlx::query_as(
            "SELECT e.id, e.student_id, e.course_id, e.enrolled_at, e.completed_at,
                    e.progress_percentage,
                    c.title AS course_title,
                    c.thumbnail_url AS course_thumbnail_url,
                    p.full_name AS teacher_name,
                    cat.name AS category_name
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             JOIN profiles p ON p.id = c.teacher_id
             LEFT JOIN categories cat ON cat.id = c.category_id
             WHERE e.student_id = $1
             ORDER BY e.enrolled_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(enrollments)
    }

    /// Fetch an enrollment, checking it belongs to the caller
    pub async fn get_owned(
        &self,
        enrollment_id: Uuid,
        student_id: Uuid,
    ) -> Result<Enrollment, EnrollmentError> {
        let enrollment: Option<Enrollment> = sqlx::query_as(
            "SELECT id, student_id, course_id, enrolled_at, completed_at, progress_percentage
             FROM enrollments
             WHERE id = $1",
        )
        .bind(enrollment_id)
        .fetch_optional(&self.pool)
        .await?;

        let enrollment = enrollment.ok_or(EnrollmentError::EnrollmentNotFound(enrollment_id))?;
        if enrollment.student_id != student_id {
            return Err(EnrollmentError::NotEnrollmentOwner);
        }
        Ok(enrollment)
    }

    fn assert_student(role: Role) -> Result<(), EnrollmentError> {
        if role != Role::Student {
            return Err(EnrollmentError::StudentRoleRequired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_students_may_enroll() {
        assert!(EnrollmentService::assert_student(Role::Student).is_ok());
        assert!(matches!(
            EnrollmentService::assert_student(Role::Teacher),
            Err(EnrollmentError::StudentRoleRequired)
        ));
    }
}
