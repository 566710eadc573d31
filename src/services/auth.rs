use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims, JwtError};
use crate::database::models::profile::{Profile, Role};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Role,
}

/// Authenticated session: JWT plus the profile it was issued for
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub expires_in_secs: u64,
    pub profile: Profile,
}

const PROFILE_COLUMNS: &str =
    "id, email, full_name, role, avatar_url, bio, created_at, updated_at";

pub struct AuthService {
    pool: PgPool,
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new account with the requested role and return a session
    pub async fn register(&self, input: RegisterInput) -> Result<Session, AuthError> {
        Self::validate_email(&input.email)?;
        Self::validate_password(&input.password)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM profiles WHERE email = $1)")
                .bind(&input.email)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(AuthError::EmailTaken(input.email));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
            .to_string();

        let profile: Profile = sqlx::query_as(&format!(
            "INSERT INTO profiles (email, password_hash, full_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.full_name)
        .bind(input.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(profile_id = %profile.id, role = %input.role, "registered new account");
        self.issue_session(profile)
    }

    /// Verify credentials and return a session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let row: Option<(Uuid, String)> =
            sqlx::query_as("SELECT id, password_hash FROM profiles WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        let (profile_id, password_hash) = row.ok_or(AuthError::InvalidCredentials)?;

        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        let profile = self
            .get_profile(profile_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.issue_session(profile)
    }

    pub async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AuthError> {
        let profile: Option<Profile> = sqlx::query_as(&format!(
            "SELECT {} FROM profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    fn issue_session(&self, profile: Profile) -> Result<Session, AuthError> {
        let role: Role = profile
            .role
            .parse()
            .map_err(|e: String| AuthError::Validation(e))?;
        let claims = Claims::new(profile.id, profile.email.clone(), role);
        let token = generate_jwt(&claims)?;

        Ok(Session {
            token,
            expires_in_secs: crate::config::config().security.jwt_expiry_hours * 3600,
            profile,
        })
    }

    fn validate_email(email: &str) -> Result<(), AuthError> {
        if email.len() < 3 || !email.contains('@') {
            return Err(AuthError::Validation("A valid email is required".to_string()));
        }
        Ok(())
    }

    fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.len() < 6 {
            return Err(AuthError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(AuthService::validate_email("student@example.com").is_ok());
        assert!(AuthService::validate_email("").is_err());
        assert!(AuthService::validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_password_validation() {
        assert!(AuthService::validate_password("secret-password").is_ok());
        assert!(AuthService::validate_password("short").is_err());
    }
}
