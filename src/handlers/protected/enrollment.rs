use axum::{extract::Path, response::Json, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::progress_store::progress_tracker;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::enrollment::EnrollmentService;

/// POST /api/courses/:id/enroll - Enroll the caller in a published course
/// (students only)
pub async fn enroll(
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let enrollment = EnrollmentService::new(pool)
        .enroll(user.id, user.role, course_id)
        .await?;

    Ok(Json(json!({ "success": true, "data": enrollment })))
}

/// GET /api/enrollments - The caller's enrollments with course summaries
pub async fn list_enrollments(
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let enrollments = EnrollmentService::new(pool).list_for_student(user.id).await?;

    Ok(Json(json!({ "success": true, "data": enrollments })))
}

/// POST /api/courses/:course_id/lessons/:lesson_id/complete - Mark a lesson
/// complete for the caller's enrollment and recompute course progress
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "enrollment_id": "uuid",
///     "progress_percentage": 40,
///     "completed_at": null,
///     "completed_lessons": 2,
///     "total_lessons": 5
///   }
/// }
/// ```
pub async fn complete_lesson(
    Extension(user): Extension<AuthUser>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let tracker = progress_tracker(pool);

    let progress = tracker
        .mark_lesson_complete(user.id, course_id, lesson_id)
        .await?;

    Ok(Json(json!({ "success": true, "data": progress })))
}

/// GET /api/enrollments/:id/lessons/:lesson_id/progress - Completion state of
/// one lesson for the caller's enrollment; missing rows read as "not started"
pub async fn lesson_progress(
    Extension(user): Extension<AuthUser>,
    Path((enrollment_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    // Reading another student's progress is not allowed
    EnrollmentService::new(pool.clone())
        .get_owned(enrollment_id, user.id)
        .await?;

    let tracker = progress_tracker(pool);
    let state = tracker.get_progress(enrollment_id, lesson_id).await?;

    Ok(Json(json!({ "success": true, "data": state })))
}
