use axum::{extract::Path, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::review::ReviewService;

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// GET /api/courses/:id/reviews - Course reviews, newest first, with the
/// average rating
pub async fn list_reviews(
    Extension(_user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let reviews = ReviewService::new(pool).list_for_course(course_id).await?;

    Ok(Json(json!({ "success": true, "data": reviews })))
}

/// POST /api/courses/:id/reviews - Review a course the caller is enrolled in
/// (students only)
pub async fn create_review(
    Extension(user): Extension<AuthUser>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let review = ReviewService::new(pool)
        .create_review(user.id, user.role, course_id, payload.rating, payload.comment)
        .await?;

    Ok(Json(json!({ "success": true, "data": review })))
}
