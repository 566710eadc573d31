use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;
use crate::database::models::profile::Role;
use crate::error::ApiError;
use crate::services::auth::{AuthService, RegisterInput, Session};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register - Create an account and receive a JWT
///
/// Expected Input:
/// ```json
/// {
///   "email": "string",       // Required
///   "password": "string",    // Required, min 6 characters
///   "full_name": "string",   // Optional
///   "role": "teacher" | "student"
/// }
/// ```
pub async fn register(Json(payload): Json<RegisterRequest>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let service = AuthService::new(pool);

    let session = service
        .register(RegisterInput {
            email: payload.email,
            password: payload.password,
            full_name: payload.full_name,
            role: payload.role,
        })
        .await?;

    Ok(Json(session_response(session)))
}

/// POST /auth/login - Authenticate and receive a JWT
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<Json<Value>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let service = AuthService::new(pool);

    let session = service.login(&payload.email, &payload.password).await?;

    Ok(Json(session_response(session)))
}

fn session_response(session: Session) -> Value {
    json!({
        "success": true,
        "data": {
            "token": session.token,
            "expires_in": session.expires_in_secs,
            "profile": session.profile
        }
    })
}
