use axum::{
    extract::{Path, Query},
    response::Json,
    Extension,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::catalog::{CatalogService, CourseFilters, CourseInput};

/// GET /api/categories - All course categories
pub async fn list_categories(
    Extension(_user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let categories = CatalogService::new(pool).list_categories().await?;

    Ok(Json(json!({ "success": true, "data": categories })))
}

/// GET /api/courses - Published course catalog
///
/// Query parameters: `search` (title/description), `category` (uuid),
/// `difficulty` (beginner|intermediate|advanced)
pub async fn list_courses(
    Extension(_user): Extension<AuthUser>,
    Query(filters): Query<CourseFilters>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let courses = CatalogService::new(pool).list_published(&filters).await?;

    Ok(Json(json!({ "success": true, "data": courses })))
}

/// GET /api/courses/mine - The calling teacher's courses, any publish state
pub async fn list_my_courses(
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let courses = CatalogService::new(pool).list_for_teacher(user.id).await?;

    Ok(Json(json!({ "success": true, "data": courses })))
}

/// GET /api/courses/:id - Single course with aggregates
pub async fn get_course(
    Extension(_user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let course = CatalogService::new(pool).get_course(course_id).await?;

    Ok(Json(json!({ "success": true, "data": course })))
}

/// POST /api/courses - Create a course (teacher only)
pub async fn create_course(
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CourseInput>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let course = CatalogService::new(pool)
        .create_course(user.id, user.role, payload)
        .await?;

    Ok(Json(json!({ "success": true, "data": course })))
}

/// PUT /api/courses/:id - Update a course (owner only)
pub async fn update_course(
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<CourseInput>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let course = CatalogService::new(pool)
        .update_course(user.id, course_id, payload)
        .await?;

    Ok(Json(json!({ "success": true, "data": course })))
}

/// POST /api/courses/:id/publish - Toggle publish state (owner only)
pub async fn toggle_publish(
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let course = CatalogService::new(pool)
        .toggle_publish(user.id, course_id)
        .await?;

    Ok(Json(json!({ "success": true, "data": course })))
}

/// DELETE /api/courses/:id - Delete a course and all nested content (owner only)
pub async fn delete_course(
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    CatalogService::new(pool)
        .delete_course(user.id, course_id)
        .await?;

    Ok(Json(json!({ "success": true, "data": { "deleted": course_id } })))
}

/// GET /api/teacher/stats - Dashboard counters for the calling teacher
pub async fn teacher_stats(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let stats = CatalogService::new(pool).teacher_stats(user.id).await?;

    Ok(Json(json!({ "success": true, "data": stats })))
}
