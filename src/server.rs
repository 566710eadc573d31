use axum::{routing::get, routing::post, routing::put, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Build the full application router
pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use public::auth;

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn api_routes() -> Router {
    use protected::{auth, catalog, content, enrollment, review};

    Router::new()
        // Identity
        .route("/api/auth/whoami", get(auth::whoami))
        // Catalog
        .route("/api/categories", get(catalog::list_categories))
        .route(
            "/api/courses",
            get(catalog::list_courses).post(catalog::create_course),
        )
        .route("/api/courses/mine", get(catalog::list_my_courses))
        .route("/api/teacher/stats", get(catalog::teacher_stats))
        .route(
            "/api/courses/:id",
            get(catalog::get_course)
                .put(catalog::update_course)
                .delete(catalog::delete_course),
        )
        .route("/api/courses/:id/publish", post(catalog::toggle_publish))
        // Course content
        .route("/api/courses/:id/outline", get(content::course_outline))
        .route("/api/courses/:id/modules", post(content::create_module))
        .route(
            "/api/modules/:id",
            put(content::update_module).delete(content::delete_module),
        )
        .route("/api/modules/:id/lessons", post(content::create_lesson))
        .route(
            "/api/lessons/:id",
            put(content::update_lesson).delete(content::delete_lesson),
        )
        // Enrollment and progress
        .route("/api/courses/:id/enroll", post(enrollment::enroll))
        .route("/api/enrollments", get(enrollment::list_enrollments))
        .route(
            "/api/courses/:course_id/lessons/:lesson_id/complete",
            post(enrollment::complete_lesson),
        )
        .route(
            "/api/enrollments/:id/lessons/:lesson_id/progress",
            get(enrollment::lesson_progress),
        )
        // Reviews
        .route(
            "/api/courses/:id/reviews",
            get(review::list_reviews).post(review::create_review),
        )
        .route_layer(axum::middleware::from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "LearnHub API",
            "version": version,
            "description": "E-learning platform backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/auth/register, /auth/login (public - token acquisition)",
                "whoami": "/api/auth/whoami (protected)",
                "categories": "/api/categories (protected)",
                "courses": "/api/courses[/:id] (protected)",
                "content": "/api/courses/:id/outline, /api/modules/:id, /api/lessons/:id (protected)",
                "enrollments": "/api/courses/:id/enroll, /api/enrollments (protected)",
                "progress": "/api/courses/:course/lessons/:lesson/complete (protected)",
                "reviews": "/api/courses/:id/reviews (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
