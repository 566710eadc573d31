use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};

use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::database::models::profile::Role;
use crate::error::ApiError;

/// Authenticated user context extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware that validates tokens and extracts user context
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_jwt_from_headers(&headers).map_err(unauthorized)?;

    let claims = validate_jwt(&token)
        .map_err(|e| unauthorized(format!("Invalid token: {}", e)))?;

    // Inject the caller's identity into the request for downstream handlers
    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

fn unauthorized(msg: impl Into<String>) -> Response {
    let api_error = ApiError::unauthorized(msg);
    (
        StatusCode::from_u16(api_error.status_code()).unwrap_or(StatusCode::UNAUTHORIZED),
        Json(api_error.to_json()),
    )
        .into_response()
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use the Bearer scheme".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert!(extract_jwt_from_headers(&headers).is_err());
    }

    #[test]
    fn test_empty_bearer_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        assert!(extract_jwt_from_headers(&headers).is_err());
    }
}
