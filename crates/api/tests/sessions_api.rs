//! HTTP-level integration tests for sessions, conversation turns,
//! selections and recorded results.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_session, expect_data, get_auth, post_json_auth, put_json_auth, token_for,
    valid_creative, StubCompletions, INITIAL_REPLY,
};
use serde_json::json;
use sqlx::PgPool;

use adsage_llm::CompletionError;

const FOLLOW_UP_REPLY: &str = "Variation 1 leads with the discount, which suits a sale.";

/// Run the initial turn and return the response data.
async fn run_initial(app: axum::Router, token: &str, key: &str) -> serde_json::Value {
    expect_data(
        post_json_auth(
            app,
            &format!("/api/v1/sessions/{key}/messages"),
            token,
            json!({ "content": "Please analyze my ad" }),
        )
        .await,
        StatusCode::OK,
    )
    .await
}

fn recommendation_ids(turn: &serde_json::Value) -> Vec<i64> {
    turn["variations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["recommendation_id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn session_is_found_by_key_and_by_id(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    assert_eq!(key.len(), 16);

    let by_key = expect_data(
        get_auth(app.clone(), &format!("/api/v1/sessions/{key}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(by_key["phase"], "initial");
    assert_eq!(by_key["title"], "Summer sale");
    assert_eq!(by_key["creative"]["headline"], "Summer Running Sale");

    let id = by_key["id"].as_i64().unwrap();
    let by_id = expect_data(
        get_auth(app.clone(), &format!("/api/v1/sessions/{id}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(by_id["session_key"], key.as_str());

    let listed = expect_data(get_auth(app, "/api/v1/sessions", &token).await, StatusCode::OK).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_users_sessions_are_not_found(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let key = create_session(app.clone(), &token_for("owner")).await;

    let response = get_auth(app, &format!("/api/v1/sessions/{key}"), &token_for("intruder")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_creative_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool, StubCompletions::with_replies([]));
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;

    let response = put_json_auth(
        app,
        &format!("/api/v1/sessions/{key}/creative"),
        &token,
        json!({ "creative": { "headline": "Only a headline" } }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"].as_str().unwrap().contains("primary_text"));
}

// ---------------------------------------------------------------------------
// Conversation turns
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn initial_turn_persists_and_hydrates_variations(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY]);
    let app = common::build_test_app(pool, stub.clone());
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;

    let turn = run_initial(app.clone(), &token, &key).await;

    assert_eq!(turn["phase"], "initial");
    assert_eq!(turn["next_phase"], "follow_up");
    assert!(turn["analysis"].as_str().unwrap().contains("headline is generic"));
    let score = turn["score"].as_f64().unwrap();
    assert!((score - 0.8).abs() < 1e-9);

    let variations = turn["variations"].as_array().unwrap();
    assert_eq!(variations.len(), 2);
    for variation in variations {
        let rec_id = variation["recommendation_id"].as_i64().unwrap();
        assert_eq!(variation["id"], rec_id.to_string());
    }
    assert_eq!(variations[0]["headline"], "Run Further, Pay Less");

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, Some(2000));
    assert!(requests[0].user.contains("Summer Running Sale"));
    assert!(requests[0].user.contains("user: Please analyze my ad"));

    let session = expect_data(
        get_auth(app, &format!("/api/v1/sessions/{key}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(session["phase"], "follow_up");
    let messages = session["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["variations"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn follow_up_turn_stores_plain_reply(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY, FOLLOW_UP_REPLY]);
    let app = common::build_test_app(pool, stub.clone());
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    let initial = run_initial(app.clone(), &token, &key).await;

    let turn = expect_data(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/sessions/{key}/messages"),
            &token,
            json!({ "content": "Which one should I run first?" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(turn["phase"], "follow_up");
    assert_eq!(turn["analysis"], FOLLOW_UP_REPLY);
    assert!(turn["variations"].as_array().unwrap().is_empty());
    assert!(turn["score"].is_null());

    let requests = stub.requests();
    assert_eq!(requests[1].max_tokens, None);
    assert!(requests[1].user.contains("Which one should I run first?"));

    let session = expect_data(
        get_auth(app, &format!("/api/v1/sessions/{key}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(session["messages"].as_array().unwrap().len(), 4);
    assert!(session["messages"][3]["variations"].is_null());
    assert_eq!(recommendation_ids(&initial).len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn turn_without_creative_is_rejected_before_the_provider_is_called(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY]);
    let app = common::build_test_app(pool, stub.clone());
    let token = token_for("owner");

    let created = expect_data(
        post_json_auth(app.clone(), "/api/v1/sessions", &token, json!({})).await,
        StatusCode::CREATED,
    )
    .await;
    let key = created["session_key"].as_str().unwrap();
    assert_eq!(created["title"], "New analysis");

    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{key}/messages"),
        &token,
        json!({ "content": "Analyze" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stub.requests().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_before_variations_is_rejected(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY]);
    let app = common::build_test_app(pool, stub.clone());
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{key}/messages"),
        &token,
        json!({ "content": "How did it do?", "performance_review": true }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stub.requests().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn provider_failure_is_bad_gateway(pool: PgPool) {
    let stub = StubCompletions::with_replies([]);
    stub.push_error(CompletionError::Api {
        status: 500,
        body: "boom".into(),
    });
    let app = common::build_test_app(pool, stub);
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/sessions/{key}/messages"),
        &token,
        json!({ "content": "Analyze" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UPSTREAM_ERROR");

    // Nothing was generated, so the session is still in the initial phase.
    let session = expect_data(
        get_auth(app, &format!("/api/v1/sessions/{key}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(session["phase"], "initial");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reply_without_markers_keeps_the_session_initial(pool: PgPool) {
    let stub = StubCompletions::with_replies(["I could not produce variations this time."]);
    let app = common::build_test_app(pool, stub);
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;

    let turn = run_initial(app, &token, &key).await;

    assert_eq!(turn["phase"], "initial");
    assert_eq!(turn["next_phase"], "initial");
    assert!(turn["variations"].as_array().unwrap().is_empty());
    assert!(turn["score"].is_null());
}

// ---------------------------------------------------------------------------
// Selections
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_selection_triggers_a_follow_up(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY, FOLLOW_UP_REPLY]);
    let app = common::build_test_app(pool, stub.clone());
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    let ids = recommendation_ids(&run_initial(app.clone(), &token, &key).await);

    let first = expect_data(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/sessions/{key}/selections/{}", ids[0]),
            &token,
            json!({}),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(first["selected"], true);
    assert_eq!(first["selection"]["status"], "draft");
    assert_eq!(first["follow_up"]["analysis"], FOLLOW_UP_REPLY);
    assert!(stub.requests()[1]
        .user
        .contains("I've selected variation 1. Are these the ads you like the most?"));

    let second = expect_data(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/sessions/{key}/selections/{}", ids[1]),
            &token,
            json!({}),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert!(second["follow_up"].is_null());
    assert_eq!(stub.requests().len(), 2);

    let listed = expect_data(
        get_auth(app, &format!("/api/v1/sessions/{key}/selections"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn selecting_after_every_selection_was_removed_triggers_a_follow_up(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY, FOLLOW_UP_REPLY, FOLLOW_UP_REPLY]);
    let app = common::build_test_app(pool, stub.clone());
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    let ids = recommendation_ids(&run_initial(app.clone(), &token, &key).await);
    let first_path = format!("/api/v1/sessions/{key}/selections/{}", ids[0]);

    post_json_auth(app.clone(), &first_path, &token, json!({})).await;
    let activated = put_json_auth(
        app.clone(),
        &format!("/api/v1/selections/{}/status", ids[0]),
        &token,
        json!({ "status": "active" }),
    )
    .await;
    assert_eq!(activated.status(), StatusCode::OK);

    let off = expect_data(
        post_json_auth(app.clone(), &first_path, &token, json!({})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(off["selected"], false);
    assert_eq!(stub.requests().len(), 2);

    let second = expect_data(
        post_json_auth(
            app,
            &format!("/api/v1/sessions/{key}/selections/{}", ids[1]),
            &token,
            json!({}),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(second["selected"], true);
    assert_eq!(second["follow_up"]["analysis"], FOLLOW_UP_REPLY);
    assert_eq!(stub.requests().len(), 3);
    assert!(stub.requests()[2].user.contains("I've selected variation 2."));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn toggling_twice_restores_status(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY, FOLLOW_UP_REPLY]);
    let app = common::build_test_app(pool, stub);
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    let rec_id = recommendation_ids(&run_initial(app.clone(), &token, &key).await)[0];
    let toggle_path = format!("/api/v1/sessions/{key}/selections/{rec_id}");

    post_json_auth(app.clone(), &toggle_path, &token, json!({})).await;

    let activated = expect_data(
        put_json_auth(
            app.clone(),
            &format!("/api/v1/selections/{rec_id}/status"),
            &token,
            json!({ "status": "active" }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(activated["status"], "active");

    let off = expect_data(
        post_json_auth(app.clone(), &toggle_path, &token, json!({})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(off["selected"], false);
    assert!(off["selection"]["deselected_at"].is_string());

    let on = expect_data(
        post_json_auth(app.clone(), &toggle_path, &token, json!({})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(on["selected"], true);
    assert_eq!(on["selection"]["status"], "active");
    assert!(on["selection"]["deselected_at"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_status_transition_is_rejected(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY, FOLLOW_UP_REPLY]);
    let app = common::build_test_app(pool, stub);
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    let rec_id = recommendation_ids(&run_initial(app.clone(), &token, &key).await)[0];

    post_json_auth(
        app.clone(),
        &format!("/api/v1/sessions/{key}/selections/{rec_id}"),
        &token,
        json!({}),
    )
    .await;

    let response = put_json_auth(
        app,
        &format!("/api/v1/selections/{rec_id}/status"),
        &token,
        json!({ "status": "completed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recommendation_from_another_session_cannot_be_selected(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY]);
    let app = common::build_test_app(pool, stub);
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    let rec_id = recommendation_ids(&run_initial(app.clone(), &token, &key).await)[0];
    let other_key = create_session(app.clone(), &token).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/sessions/{other_key}/selections/{rec_id}"),
        &token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Results and performance review
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn results_feed_the_performance_review(pool: PgPool) {
    let stub = StubCompletions::with_replies([
        INITIAL_REPLY,
        FOLLOW_UP_REPLY,
        "Variation 1 converted well; raise its budget.",
    ]);
    let app = common::build_test_app(pool, stub.clone());
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    let ids = recommendation_ids(&run_initial(app.clone(), &token, &key).await);

    // Results are only accepted for selected recommendations.
    let rejected = post_json_auth(
        app.clone(),
        &format!("/api/v1/sessions/{key}/results"),
        &token,
        json!({ "results": [{ "recommendation_id": ids[0], "impressions": 1000 }] }),
    )
    .await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    post_json_auth(
        app.clone(),
        &format!("/api/v1/sessions/{key}/selections/{}", ids[0]),
        &token,
        json!({}),
    )
    .await;

    let recorded = expect_data(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/sessions/{key}/results"),
            &token,
            json!({ "results": [{
                "recommendation_id": ids[0],
                "impressions": 1000,
                "clicks": 50,
                "spend": 25.0,
                "conversions": 5
            }] }),
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    let row = &recorded[0];
    assert!((row["ctr"].as_f64().unwrap() - 5.0).abs() < 1e-9);
    assert!((row["cpc"].as_f64().unwrap() - 0.5).abs() < 1e-9);

    let review = expect_data(
        post_json_auth(
            app.clone(),
            &format!("/api/v1/sessions/{key}/messages"),
            &token,
            json!({ "content": "How did it go?", "performance_review": true }),
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(review["phase"], "performance_review");
    assert_eq!(review["next_phase"], "follow_up");

    let prompt = &stub.requests()[2].user;
    assert!(prompt.contains("Recorded Results"));
    assert!(prompt.contains("Run Further, Pay Less"));

    let ad_id = row["ad_id"].as_i64().unwrap();
    let ad = expect_data(
        get_auth(app, &format!("/api/v1/ads/{ad_id}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ad["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(ad["results"].as_array().unwrap().len(), 1);
    let types: Vec<_> = ad["analyses"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["analysis_type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(types, ["initial", "follow_up", "performance_review"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ads_of_other_users_are_hidden(pool: PgPool) {
    let stub = StubCompletions::with_replies([INITIAL_REPLY, FOLLOW_UP_REPLY]);
    let app = common::build_test_app(pool, stub);
    let token = token_for("owner");
    let key = create_session(app.clone(), &token).await;
    let rec_id = recommendation_ids(&run_initial(app.clone(), &token, &key).await)[0];

    post_json_auth(
        app.clone(),
        &format!("/api/v1/sessions/{key}/selections/{rec_id}"),
        &token,
        json!({}),
    )
    .await;
    let selections = expect_data(
        get_auth(app.clone(), &format!("/api/v1/sessions/{key}/selections"), &token).await,
        StatusCode::OK,
    )
    .await;
    let ad_id = selections[0]["ad_id"].as_i64().unwrap();

    let own = expect_data(
        get_auth(app.clone(), &format!("/api/v1/ads/{ad_id}"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(own["headline"], valid_creative()["headline"]);

    let response = get_auth(app, &format!("/api/v1/ads/{ad_id}"), &token_for("intruder")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
