use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::lesson::Lesson;
use crate::database::models::module::Module;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("course not found: {0}")]
    CourseNotFound(Uuid),

    #[error("module not found: {0}")]
    ModuleNotFound(Uuid),

    #[error("lesson not found: {0}")]
    LessonNotFound(Uuid),

    #[error("caller does not own this course")]
    NotCourseOwner,

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Deserialize)]
pub struct ModuleInput {
    pub title: String,
    pub description: Option<String>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct LessonInput {
    pub title: String,
    pub content: Option<String>,
    pub video_url: Option<String>,
    pub duration_minutes: Option<i32>,
    pub order_index: Option<i32>,
}

/// Module with its lessons, both ordered by order_index
#[derive(Debug, Serialize)]
pub struct ModuleWithLessons {
    #[serde(flatten)]
    pub module: Module,
    pub lessons: Vec<Lesson>,
}

pub struct ContentService {
    pool: PgPool,
}

impl ContentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Full course outline: ordered modules, each with its ordered lessons
    pub async fn course_outline(
        &self,
        course_id: Uuid,
    ) -> Result<Vec<ModuleWithLessons>, ContentError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM courses WHERE id = $1)")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(ContentError::CourseNotFound(course_id));
        }

        let modules: Vec<Module> = sqlx::query_as(
            "SELECT id, course_id, title, description, order_index, created_at
             FROM modules
             WHERE course_id = $1
             ORDER BY order_index, created_at",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let lessons: Vec<Lesson> = sqlx::query_as(
            "SELECT l.id, l.module_id, l.title, l.content, l.video_url,
                    l.duration_minutes, l.order_index, l.created_at
             FROM lessons l
             JOIN modules m ON m.id = l.module_id
             WHERE m.course_id = $1
             ORDER BY l.order_index, l.created_at",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let outline = modules
            .into_iter()
            .map(|module| {
                let module_lessons = lessons
                    .iter()
                    .filter(|lesson| lesson.module_id == module.id)
                    .cloned()
                    .collect();
                ModuleWithLessons {
                    module,
                    lessons: module_lessons,
                }
            })
            .collect();

        Ok(outline)
    }

    pub async fn create_module(
        &self,
        teacher_id: Uuid,
        course_id: Uuid,
        input: ModuleInput,
    ) -> Result<Module, ContentError> {
        Self::validate_title(&input.title)?;
        self.assert_course_owner(teacher_id, course_id).await?;

        // Append to the end of the course unless a position was given
        let module: Module = sqlx::query_as(
            "INSERT INTO modules (course_id, title, description, order_index)
             VALUES ($1, $2, $3, COALESCE(
                 $4,
                 (SELECT COALESCE(MAX(order_index) + 1, 0) FROM modules WHERE course_id = $1)
             ))
             RETURNING id, course_id, title, description, order_index, created_at",
        )
        .bind(course_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(module)
    }

    pub async fn update_module(
        &self,
        teacher_id: Uuid,
        module_id: Uuid,
        input: ModuleInput,
    ) -> Result<Module, ContentError> {
        Self::validate_title(&input.title)?;
        self.assert_module_owner(teacher_id, module_id).await?;

        let module: Module = sqlx::query_as(
            "UPDATE modules
             SET title = $2, description = $3, order_index = COALESCE($4, order_index)
             WHERE id = $1
             RETURNING id, course_id, title, description, order_index, created_at",
        )
        .bind(module_id)
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(module)
    }

    /// Delete a module and, by cascade, its lessons. Lesson counts shrink for
    /// every enrollment in the course, so percentages recompute on the next
    /// completion event.
    pub async fn delete_module(
        &self,
        teacher_id: Uuid,
        module_id: Uuid,
    ) -> Result<(), ContentError> {
        self.assert_module_owner(teacher_id, module_id).await?;

        sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(module_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn create_lesson(
        &self,
        teacher_id: Uuid,
        module_id: Uuid,
        input: LessonInput,
    ) -> Result<Lesson, ContentError> {
        Self::validate_title(&input.title)?;
        Self::validate_duration(input.duration_minutes)?;
        self.assert_module_owner(teacher_id, module_id).await?;

        let lesson: Lesson = sqlx::query_as(
            "INSERT INTO lessons (module_id, title, content, video_url, duration_minutes, order_index)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE(
                 $6,
                 (SELECT COALESCE(MAX(order_index) + 1, 0) FROM lessons WHERE module_id = $1)
             ))
             RETURNING id, module_id, title, content, video_url, duration_minutes,
                       order_index, created_at",
        )
        .bind(module_id)
        .bind(input.title.trim())
        .bind(&input.content)
        .bind(&input.video_url)
        .bind(input.duration_minutes)
        .bind(input.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(lesson)
    }

    pub async fn update_lesson(
        &self,
        teacher_id: Uuid,
        lesson_id: Uuid,
        input: LessonInput,
    ) -> Result<Lesson, ContentError> {
        Self::validate_title(&input.title)?;
        Self::validate_duration(input.duration_minutes)?;
        self.assert_lesson_owner(teacher_id, lesson_id).await?;

        let lesson: Lesson = sqlx::query_as(
            "UPDATE lessons
             SET title = $2, content = $3, video_url = $4,
                 duration_minutes = COALESCE($5, duration_minutes),
                 order_index = COALESCE($6, order_index)
             WHERE id = $1
             RETURNING id, module_id, title, content, video_url, duration_minutes,
                       order_index, created_at",
        )
        .bind(lesson_id)
        .bind(input.title.trim())
        .bind(&input.content)
        .bind(&input.video_url)
        .bind(input.duration_minutes)
        .bind(input.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(lesson)
    }

    pub async fn delete_lesson(
        &self,
        teacher_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<(), ContentError> {
        self.assert_lesson_owner(teacher_id, lesson_id).await?;

        sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn assert_course_owner(
        &self,
        teacher_id: Uuid,
        course_id: Uuid,
    ) -> Result<(), ContentError> {
        let owner: Option<Uuid> = sqlx::query_scalar("SELECT teacher_id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&self.pool)
            .await?;

        match owner {
            None => Err(ContentError::CourseNotFound(course_id)),
            Some(owner) if owner != teacher_id => Err(ContentError::NotCourseOwner),
            Some(_) => Ok(()),
        }
    }

    async fn assert_module_owner(
        &self,
        teacher_id: Uuid,
        module_id: Uuid,
    ) -> Result<(), ContentError> {
        let owner: Option<Uuid> = sqlx::query_scalar(
            "SELECT c.teacher_id
             FROM modules m
             JOIN courses c ON c.id = m.course_id
             WHERE m.id = $1",
        )
        .bind(module_id)
        .fetch_optional(&self.pool)
        .await?;

        match owner {
            None => Err(ContentError::ModuleNotFound(module_id)),
            Some(owner) if owner != teacher_id => Err(ContentError::NotCourseOwner),
            Some(_) => Ok(()),
        }
    }

    async fn assert_lesson_owner(
        &self,
        teacher_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<(), ContentError> {
        let owner: Option<Uuid> = sqlx::query_scalar(
            "SELECT c.teacher_id
             FROM lessons l
             JOIN modules m ON m.id = l.module_id
             JOIN courses c ON c.id = m.course_id
             WHERE l.id = $1",
        )
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;

        match owner {
            None => Err(ContentError::LessonNotFound(lesson_id)),
            Some(owner) if owner != teacher_id => Err(ContentError::NotCourseOwner),
            Some(_) => Ok(()),
        }
    }

    fn validate_title(title: &str) -> Result<(), ContentError> {
        if title.trim().is_empty() {
            return Err(ContentError::Validation("Title is required".to_string()));
        }
        Ok(())
    }

    fn validate_duration(duration_minutes: Option<i32>) -> Result<(), ContentError> {
        if let Some(minutes) = duration_minutes {
            if minutes < 0 {
                return Err(ContentError::Validation(
                    "Duration cannot be negative".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_validation() {
        assert!(ContentService::validate_title("Getting Started").is_ok());
        assert!(ContentService::validate_title("").is_err());
        assert!(ContentService::validate_title("  ").is_err());
    }

    #[test]
    fn test_duration_validation() {
        assert!(ContentService::validate_duration(None).is_ok());
        assert!(ContentService::validate_duration(Some(0)).is_ok());
        assert!(ContentService::validate_duration(Some(45)).is_ok());
        assert!(ContentService::validate_duration(Some(-5)).is_err());
    }
}
