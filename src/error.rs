// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        ApiError::ValidationError(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert service error types to ApiError
impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        match err {
            crate::database::manager::DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            crate::database::manager::DatabaseError::ConfigMissing(_)
            | crate::database::manager::DatabaseError::InvalidDatabaseUrl => {
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            crate::database::manager::DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
            crate::database::manager::DatabaseError::MigrationError(msg) => {
                tracing::error!("Migration error: {}", msg);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
        }
    }
}

impl From<crate::services::auth::AuthError> for ApiError {
    fn from(err: crate::services::auth::AuthError) -> Self {
        use crate::services::auth::AuthError;
        match err {
            AuthError::InvalidCredentials => {
                ApiError::unauthorized("Invalid email or password")
            }
            AuthError::EmailTaken(email) => {
                ApiError::conflict(format!("An account already exists for {}", email))
            }
            AuthError::Validation(msg) => ApiError::validation_error(msg),
            AuthError::PasswordHash(msg) => {
                tracing::error!("Password hashing error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            AuthError::Token(e) => {
                tracing::error!("JWT error: {}", e);
                ApiError::internal_server_error("Failed to issue session token")
            }
            AuthError::Database(e) => {
                tracing::error!("Auth database error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::services::catalog::CatalogError> for ApiError {
    fn from(err: crate::services::catalog::CatalogError) -> Self {
        use crate::services::catalog::CatalogError;
        match err {
            CatalogError::CourseNotFound(id) => {
                ApiError::not_found(format!("Course {} not found", id))
            }
            CatalogError::NotCourseOwner => {
                ApiError::forbidden("Only the course owner can perform this action")
            }
            CatalogError::TeacherRoleRequired => {
                ApiError::forbidden("Only teachers can perform this action")
            }
            CatalogError::Validation(msg) => ApiError::validation_error(msg),
            CatalogError::Database(e) => {
                tracing::error!("Catalog database error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::services::content::ContentError> for ApiError {
    fn from(err: crate::services::content::ContentError) -> Self {
        use crate::services::content::ContentError;
        match err {
            ContentError::CourseNotFound(id) => {
                ApiError::not_found(format!("Course {} not found", id))
            }
            ContentError::ModuleNotFound(id) => {
                ApiError::not_found(format!("Module {} not found", id))
            }
            ContentError::LessonNotFound(id) => {
                ApiError::not_found(format!("Lesson {} not found", id))
            }
            ContentError::NotCourseOwner => {
                ApiError::forbidden("Only the course owner can manage its content")
            }
            ContentError::Validation(msg) => ApiError::validation_error(msg),
            ContentError::Database(e) => {
                tracing::error!("Content database error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::services::enrollment::EnrollmentError> for ApiError {
    fn from(err: crate::services::enrollment::EnrollmentError) -> Self {
        use crate::services::enrollment::EnrollmentError;
        match err {
            EnrollmentError::CourseNotFound(id) => {
                ApiError::not_found(format!("Course {} not found", id))
            }
            EnrollmentError::EnrollmentNotFound(id) => {
                ApiError::not_found(format!("Enrollment {} not found", id))
            }
            EnrollmentError::AlreadyEnrolled => {
                ApiError::conflict("Already enrolled in this course")
            }
            EnrollmentError::StudentRoleRequired => {
                ApiError::forbidden("Only students can enroll in courses")
            }
            EnrollmentError::NotEnrollmentOwner => {
                ApiError::forbidden("This enrollment belongs to another student")
            }
            EnrollmentError::Database(e) => {
                tracing::error!("Enrollment database error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::services::review::ReviewError> for ApiError {
    fn from(err: crate::services::review::ReviewError) -> Self {
        use crate::services::review::ReviewError;
        match err {
            ReviewError::CourseNotFound(id) => {
                ApiError::not_found(format!("Course {} not found", id))
            }
            ReviewError::NotEnrolled => {
                ApiError::forbidden("Only enrolled students can review a course")
            }
            ReviewError::StudentRoleRequired => {
                ApiError::forbidden("Only students can review courses")
            }
            ReviewError::AlreadyReviewed => {
                ApiError::conflict("You have already reviewed this course")
            }
            ReviewError::Validation(msg) => ApiError::validation_error(msg),
            ReviewError::Database(e) => {
                tracing::error!("Review database error: {}", e);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<crate::services::progress::ProgressError> for ApiError {
    fn from(err: crate::services::progress::ProgressError) -> Self {
        use crate::services::progress::ProgressError;
        match err {
            ProgressError::NotEnrolled {
                student_id,
                course_id,
            } => ApiError::not_found(format!(
                "Student {} is not enrolled in course {}",
                student_id, course_id
            )),
            ProgressError::Store(e) => {
                tracing::error!("Progress store error: {}", e);
                ApiError::service_unavailable("Progress could not be saved, please retry")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
