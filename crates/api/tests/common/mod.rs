#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use adsage_api::advisor::AnalysisAdvisor;
use adsage_api::auth::jwt::{generate_token, AuthConfig};
use adsage_api::config::ServerConfig;
use adsage_api::router::build_app_router;
use adsage_api::state::AppState;
use adsage_llm::{CompletionConfig, CompletionError, CompletionProvider, CompletionRequest};
use adsage_payments::{PaymentsClient, PaymentsConfig};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";

// ---------------------------------------------------------------------------
// Stub completion provider
// ---------------------------------------------------------------------------

/// Completion provider that replays queued replies and records requests.
#[derive(Default)]
pub struct StubCompletions {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubCompletions {
    pub fn with_replies(replies: impl IntoIterator<Item = &'static str>) -> Arc<Self> {
        let stub = Self::default();
        stub.replies
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(|r| Ok(r.to_string())));
        Arc::new(stub)
    }

    pub fn push_error(&self, err: CompletionError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for StubCompletions {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyCompletion))
    }
}

/// An initial-phase reply with two variations scored 0.9 and 70%.
pub const INITIAL_REPLY: &str = "\
=== ANALYSIS ===
The headline is generic and the CTA is buried.

=== VARIATION 1 ===
Headline: Run Further, Pay Less
Primary Text: Our lightest trainers are 20% off this week.
Call to Action: SHOP_NOW
Targeting: Runners 25-44
Budget: $30/day
AI Score: 0.9

=== VARIATION 2 ===
Headline: Your Next PR Starts Here
Primary Text: Engineered cushioning for every mile.
Call to Action: LEARN_MORE
Targeting: Marathon interest
Budget: $20/day
AI Score: 70%
";

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(payments_api_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 5,
        media_dir: std::env::temp_dir()
            .join("adsage-test-media")
            .to_string_lossy()
            .into_owned(),
        public_base_url: "http://localhost:3000".to_string(),
        auth: AuthConfig {
            secret: TEST_JWT_SECRET.to_string(),
            audience: None,
        },
        completion: CompletionConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: "test-key".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.7,
            initial_max_tokens: 2000,
            structured_output: false,
            timeout_secs: 5,
        },
        payments: PaymentsConfig {
            api_url: payments_api_url.trim_end_matches('/').to_string(),
            secret_key: "sk_test".to_string(),
            webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
            signature_tolerance_secs: 300,
            app_url: "http://localhost:5173".to_string(),
            timeout_secs: 5,
        },
    }
}

/// Build the full application router over the given pool and stub provider.
pub fn build_test_app(pool: PgPool, completions: Arc<StubCompletions>) -> Router {
    build_test_app_with_payments(pool, completions, "http://127.0.0.1:9")
}

/// Like [`build_test_app`], pointing the payments client at `payments_api_url`.
pub fn build_test_app_with_payments(
    pool: PgPool,
    completions: Arc<StubCompletions>,
    payments_api_url: &str,
) -> Router {
    let config = test_config(payments_api_url);
    let advisor = AnalysisAdvisor::new(pool.clone(), completions, &config.completion);
    let payments = PaymentsClient::new(config.payments.clone()).expect("payments client builds");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        advisor: Arc::new(advisor),
        payments: Arc::new(payments),
    };

    build_app_router(state, &config)
}

/// Bearer token for an auth-provider subject.
pub fn token_for(subject: &str) -> String {
    let config = AuthConfig {
        secret: TEST_JWT_SECRET.to_string(),
        audience: None,
    };
    generate_token(subject, Some(&format!("{subject}@example.com")), 3600, &config)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, path: &str) -> Response {
    app.oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_auth(app: Router, path: &str, token: &str) -> Response {
    let request = Request::get(path)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send_json_auth(app, "POST", path, token, body).await
}

pub async fn put_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    send_json_auth(app, "PUT", path, token, body).await
}

async fn send_json_auth(
    app: Router,
    method: &str,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the `data` field of the body.
pub async fn expect_data(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    let mut json = body_json(response).await;
    json["data"].take()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn valid_creative() -> serde_json::Value {
    serde_json::json!({
        "headline": "Summer Running Sale",
        "primary_text": "Shoes for every distance.",
        "call_to_action": "SHOP_NOW",
        "objective": "SALES",
        "age_min": 25,
        "age_max": 44,
        "destination": ["Website"]
    })
}

/// Create a session with a valid creative and return its key.
pub async fn create_session(app: Router, token: &str) -> String {
    let body = serde_json::json!({
        "title": "Summer sale",
        "company_description": "Running shoe retailer",
        "creative": valid_creative(),
    });
    let data = expect_data(
        post_json_auth(app, "/api/v1/sessions", token, body).await,
        StatusCode::CREATED,
    )
    .await;
    data["session_key"].as_str().unwrap().to_string()
}
