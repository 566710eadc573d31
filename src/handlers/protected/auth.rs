use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::auth::AuthService;

/// GET /api/auth/whoami - Fresh profile for the token subject
pub async fn whoami(Extension(user): Extension<AuthUser>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let service = AuthService::new(pool);

    let profile = service
        .get_profile(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile no longer exists"))?;

    Ok(Json(json!({ "success": true, "data": profile })))
}
