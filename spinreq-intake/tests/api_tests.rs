//! Integration tests for spinreq-intake API endpoints
//!
//! Drives the full router against an in-memory SQLite database: intake
//! (quote/submit), the duplicate feedback loop through persistence, admin
//! rule CRUD, and input validation.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

use spinreq_intake::api::{create_router, AppState};

/// Test helper: in-memory database with the full schema
async fn setup_test_db() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should connect to in-memory database");

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .unwrap();
    spinreq_common::db::init::create_schema(&pool)
        .await
        .expect("Should create schema");

    pool
}

fn setup_app(db: SqlitePool) -> axum::Router {
    create_router(AppState::new(db, 0))
}

/// Test helper: JSON request
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn submit_body(title: &str, artist: &str) -> Value {
    json!({
        "organization_id": "org-1",
        "song_title": title,
        "song_artist": artist,
        "base_price_cents": 1000,
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(setup_test_db().await);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "spinreq-intake");
    assert!(body["version"].is_string());
}

// =============================================================================
// Quote (dry run)
// =============================================================================

#[tokio::test]
async fn test_quote_allows_at_base_price_with_no_rules() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/requests/quote",
            submit_body("Free Bird", "Lynyrd Skynyrd"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["decision"]["outcome"], "allow");
    assert_eq!(body["decision"]["final_price_cents"], 1000);
    assert_eq!(body["quote"]["total_cents"], 1000);
    assert!(body.get("request_id").is_none());
}

#[tokio::test]
async fn test_quote_fast_track_adds_default_fee() {
    let db = setup_test_db().await;
    spinreq_intake::db::settings::set_setting(&db, "fast_track_fee_cents", 1000)
        .await
        .unwrap();
    let app = setup_app(db);

    let mut body = submit_body("Free Bird", "Lynyrd Skynyrd");
    body["is_fast_track"] = json!(true);

    let response = app
        .oneshot(json_request("POST", "/api/v1/requests/quote", body))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;

    assert_eq!(body["quote"]["fast_track_fee_cents"], 1000);
    assert_eq!(body["quote"]["total_cents"], 2000);
}

#[tokio::test]
async fn test_quote_does_not_persist() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());

    app.oneshot(json_request(
        "POST",
        "/api/v1/requests/quote",
        submit_body("Song", "Artist"),
    ))
    .await
    .unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crowd_requests")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

// =============================================================================
// Submit + rule interactions
// =============================================================================

#[tokio::test]
async fn test_submit_persists_accepted_request() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/requests",
            submit_body("Song", "Artist"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["decision"]["outcome"], "allow");
    assert!(body["request_id"].is_string());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crowd_requests")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_blacklisted_submission_is_denied_and_not_persisted() {
    let db = setup_test_db().await;
    let app = setup_app(db.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/organizations/org-1/blacklist",
            json!({ "song_title": "Wonderwall", "song_artist": "Oasis", "reason": "overplayed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Case and punctuation differences must not dodge the blacklist
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/requests",
            submit_body("  wonderwall! ", "OASIS"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["decision"]["outcome"], "deny");
    assert_eq!(body["decision"]["final_price_cents"], 0);
    assert!(body.get("request_id").is_none());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crowd_requests")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_accepted_request_feeds_duplicate_detection() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    // Enable duplicate detection with deny
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/organizations/org-1/duplicate-rules",
            json!({
                "enabled": true,
                "action": "deny",
                "time_window_minutes": 60,
                "premium_multiplier": 1.0,
                "premium_fixed_cents": null,
                "match_by_exact_title": true,
                "match_by_exact_artist": true,
                "match_case_sensitive": false,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // First submission is accepted
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/requests",
            submit_body("Mr. Brightside", "The Killers"),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["decision"]["outcome"], "allow");

    // Identical second submission lands inside the window and is denied
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/requests",
            submit_body("Mr. Brightside", "The Killers"),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["decision"]["outcome"], "deny");
    assert_eq!(body["decision"]["reasons"][0]["kind"], "duplicate_denied");
}

#[tokio::test]
async fn test_out_of_library_premium_price() {
    let db = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/organizations/org-1/library-settings",
            json!({
                "enabled": true,
                "action": "premium_price",
                "premium_multiplier": 2.0,
                "premium_fixed_cents": null,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/requests/quote",
            submit_body("Unknown Song", "Unknown Artist"),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["decision"]["outcome"], "allow");
    assert_eq!(body["decision"]["final_price_cents"], 2000);
}

// =============================================================================
// Admin CRUD
// =============================================================================

#[tokio::test]
async fn test_blacklist_crud() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/organizations/org-1/blacklist",
            json!({ "song_title": "Song", "song_artist": "Artist" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = extract_json(response.into_body()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/organizations/org-1/blacklist"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/organizations/org-1/blacklist/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Deleting again is a 404
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/organizations/org-1/blacklist/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_rules_get_returns_defaults() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(get_request("/api/v1/organizations/org-1/duplicate-rules"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["enabled"], false);
    assert_eq!(body["action"], "allow");
    assert_eq!(body["time_window_minutes"], 60);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_empty_title_is_bad_request() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/requests",
            submit_body("   ", "Artist"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_negative_base_price_is_bad_request() {
    let app = setup_app(setup_test_db().await);

    let mut body = submit_body("Song", "Artist");
    body["base_price_cents"] = json!(-100);

    let response = app
        .oneshot(json_request("POST", "/api/v1/requests", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
