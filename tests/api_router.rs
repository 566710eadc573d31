//! Router-level tests that exercise the HTTP surface without a database.
//!
//! These drive the assembled router directly with `tower::ServiceExt::oneshot`,
//! covering routing, the auth middleware, and response envelopes.

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use learnhub_api::server::app;

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn root_endpoint_returns_service_metadata() -> Result<()> {
    let app = app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "LearnHub API");
    assert!(body["data"]["endpoints"].is_object());
    Ok(())
}

#[tokio::test]
async fn protected_route_rejects_missing_token() -> Result<()> {
    let app = app();

    let response = app
        .oneshot(Request::builder().uri("/api/categories").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn protected_route_rejects_malformed_bearer_token() -> Result<()> {
    let app = app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/enrollments")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await?;
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn protected_route_rejects_non_bearer_scheme() -> Result<()> {
    let app = app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/courses")
                .header("Authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn unknown_route_returns_not_found() -> Result<()> {
    let app = app();

    let response = app
        .oneshot(Request::builder().uri("/api/does-not-exist").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}
