use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::profile::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: String, role: Role) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("JWT validation error: {0}")]
    TokenValidation(String),
    #[error("JWT secret is not configured")]
    MissingSecret,
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    generate_jwt_with_secret(claims, &config::config().security.jwt_secret)
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    validate_jwt_with_secret(token, &config::config().security.jwt_secret)
}

fn generate_jwt_with_secret(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn validate_jwt_with_secret(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| JwtError::TokenValidation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_round_trip() {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: "teacher@example.com".to_string(),
            role: Role::Teacher,
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let token = generate_jwt_with_secret(&claims, "test-secret").unwrap();
        let decoded = validate_jwt_with_secret(&token, "test-secret").unwrap();

        assert_eq!(decoded.sub, user_id);
        assert_eq!(decoded.email, "teacher@example.com");
        assert!(matches!(decoded.role, Role::Teacher));
    }

    #[test]
    fn test_jwt_rejects_wrong_secret() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "student@example.com".to_string(),
            role: Role::Student,
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let token = generate_jwt_with_secret(&claims, "secret-a").unwrap();
        assert!(validate_jwt_with_secret(&token, "secret-b").is_err());
    }

    #[test]
    fn test_jwt_rejects_empty_secret() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "student@example.com".to_string(),
            role: Role::Student,
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        assert!(matches!(
            generate_jwt_with_secret(&claims, ""),
            Err(JwtError::MissingSecret)
        ));
    }
}
