use axum::{extract::Path, response::Json, Extension};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::content::{ContentService, LessonInput, ModuleInput};

/// GET /api/courses/:id/outline - Ordered modules with their ordered lessons
pub async fn course_outline(
    Extension(_user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let outline = ContentService::new(pool).course_outline(course_id).await?;

    Ok(Json(json!({ "success": true, "data": outline })))
}

/// POST /api/courses/:id/modules - Add a module to a course (owner only)
pub async fn create_module(
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ModuleInput>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let module = ContentService::new(pool)
        .create_module(user.id, course_id, payload)
        .await?;

    Ok(Json(json!({ "success": true, "data": module })))
}

/// PUT /api/modules/:id - Update a module (owner only)
pub async fn update_module(
    Extension(user): Extension<AuthUser>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<ModuleInput>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let module = ContentService::new(pool)
        .update_module(user.id, module_id, payload)
        .await?;

    Ok(Json(json!({ "success": true, "data": module })))
}

/// DELETE /api/modules/:id - Delete a module and its lessons (owner only)
pub async fn delete_module(
    Extension(user): Extension<AuthUser>,
    Path(module_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    ContentService::new(pool)
        .delete_module(user.id, module_id)
        .await?;

    Ok(Json(json!({ "success": true, "data": { "deleted": module_id } })))
}

/// POST /api/modules/:id/lessons - Add a lesson to a module (owner only)
pub async fn create_lesson(
    Extension(user): Extension<AuthUser>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<LessonInput>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let lesson = ContentService::new(pool)
        .create_lesson(user.id, module_id, payload)
        .await?;

    Ok(Json(json!({ "success": true, "data": lesson })))
}

/// PUT /api/lessons/:id - Update a lesson (owner only)
pub async fn update_lesson(
    Extension(user): Extension<AuthUser>,
    Path(lesson_id): Path<Uuid>,
    Json(payload): Json<LessonInput>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let lesson = ContentService::new(pool)
        .update_lesson(user.id, lesson_id, payload)
        .await?;

    Ok(Json(json!({ "success": true, "data": lesson })))
}

/// DELETE /api/lessons/:id - Delete a lesson (owner only)
pub async fn delete_lesson(
    Extension(user): Extension<AuthUser>,
    Path(lesson_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    ContentService::new(pool)
        .delete_lesson(user.id, lesson_id)
        .await?;

    Ok(Json(json!({ "success": true, "data": { "deleted": lesson_id } })))
}
