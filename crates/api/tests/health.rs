//! Integration tests for the liveness endpoint, authentication and
//! request-level middleware.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, get, get_auth, token_for, StubCompletions};
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_reports_database_and_model(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["model"], "gpt-4o");
    assert_eq!(json["checks"]["database"], true);
    assert!(json["checks"]["media_storage"].is_boolean());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let response = get(app, "/api/v1/campaigns").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn caller_request_id_is_echoed(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let request = Request::get("/health")
        .header("x-request-id", "turn-7f3a")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "turn-7f3a");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn request_id_is_generated_when_absent(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let response = get(app, "/health").await;

    let id = response.headers().get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(id.len(), 36);
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let response = get(app, "/api/v1/sessions").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let response = get_auth(app, "/api/v1/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_request_creates_the_user(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let token = token_for("provider-user-1");

    let first = body_json(get_auth(app.clone(), "/api/v1/me", &token).await).await;
    let second = body_json(get_auth(app, "/api/v1/me", &token).await).await;

    assert_eq!(first["data"]["id"], second["data"]["id"]);
    assert_eq!(first["data"]["plan_id"], "free");
    assert_eq!(first["data"]["email"], "provider-user-1@example.com");
    assert!(first["data"].get("auth_subject").is_none());
}
