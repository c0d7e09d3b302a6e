//! Integration tests for dotgrid-collect HTTP endpoints
//!
//! Tests cover:
//! - Pattern submission, validation failures, and crediting
//! - Leaderboard limits, ordering, and opt-out filtering
//! - Admin token middleware, stats, and reset
//! - Health endpoint

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use dotgrid_collect::db::{self, ledger, submissions};
use dotgrid_collect::{build_router, AppState};
use http_body_util::BodyExt; // for `collect`
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const ADMIN_TOKEN: &str = "test-admin-token";

/// Test helper: fresh on-disk database in a temp dir
///
/// The `TempDir` must outlive the pool.
async fn setup_test_db() -> (TempDir, SqlitePool) {
    let dir = TempDir::new().expect("Should create temp dir");
    let pool = db::init_database(&dir.path().join("dotgrid.db"))
        .await
        .expect("Should initialize database");
    (dir, pool)
}

/// Test helper: app on a 32x32 grid with the admin token configured
fn setup_app(db: SqlitePool) -> axum::Router {
    build_router(AppState::new(db, 32, Some(ADMIN_TOKEN.to_string())))
}

/// Test helper: `count` distinct in-bounds coordinates, row by row
fn pattern(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({ "x": i % 32, "y": i / 32 }))
        .collect()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn admin_request(method: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri("/api/admin/database")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("x-admin-token", token);
    }
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    builder.body(body).unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = body
        .collect()
        .await
        .expect("Should read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "dotgrid-collect");
    assert!(body["version"].is_string());
    assert_eq!(body["grid_size"], 32);
    assert_eq!(body["admin_enabled"], true);
}

#[tokio::test]
async fn test_health_reports_service_settings() {
    let (_dir, db) = setup_test_db().await;
    let app = build_router(AppState::new(db, 16, None));

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["grid_size"], 16);
    assert_eq!(body["admin_enabled"], false);
}

// =============================================================================
// Submission Tests
// =============================================================================

#[tokio::test]
async fn test_submit_pattern_success() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let request = json_request(
        "POST",
        "/api/submit-pattern",
        json!({ "coordinates": pattern(80), "contributorIdentity": "alice" }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Pattern submitted successfully!");
    assert_eq!(body["pointsSubmitted"], 80);
    assert!(body.get("id").is_none(), "Response must not expose a submission id");

    assert_eq!(submissions::count_submissions(&db).await.unwrap(), 1);
    let entry = ledger::get_entry(&db, "alice").await.unwrap().unwrap();
    assert_eq!(entry.contribution_count, 1);
}

#[tokio::test]
async fn test_submit_without_credit_leaves_ledger_untouched() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let request = json_request(
        "POST",
        "/api/submit-pattern",
        json!({
            "coordinates": pattern(100),
            "optedInForCredit": false,
            "contributorIdentity": "bob"
        }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(submissions::count_submissions(&db).await.unwrap(), 1);
    assert!(ledger::get_entry(&db, "bob").await.unwrap().is_none());
}

#[tokio::test]
async fn test_submit_too_few_points_rejected() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let request = json_request(
        "POST",
        "/api/submit-pattern",
        json!({ "coordinates": pattern(79), "contributorIdentity": "alice" }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("Received: 79"));

    assert_eq!(submissions::count_submissions(&db).await.unwrap(), 0);
    assert!(ledger::get_entry(&db, "alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_submit_duplicate_point_rejected() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let mut coordinates = pattern(80);
    coordinates.push(json!({ "x": 0, "y": 0 }));

    let request = json_request("POST", "/api/submit-pattern", json!({ "coordinates": coordinates }));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(submissions::count_submissions(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_submit_out_of_bounds_rejected() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let mut coordinates = pattern(80);
    coordinates[5] = json!({ "x": 32, "y": 10 });

    let request = json_request("POST", "/api/submit-pattern", json!({ "coordinates": coordinates }));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_submit_fractional_coordinate_rejected() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let mut coordinates = pattern(80);
    coordinates[0] = json!({ "x": 1.5, "y": 3 });

    let request = json_request("POST", "/api/submit-pattern", json!({ "coordinates": coordinates }));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_blank_identity_rejected_before_write() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let request = json_request(
        "POST",
        "/api/submit-pattern",
        json!({ "coordinates": pattern(80), "contributorIdentity": "   " }),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(submissions::count_submissions(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_submit_malformed_body_rejected() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let request = json_request("POST", "/api/submit-pattern", json!({ "points": [] }));
    let response = app.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

// =============================================================================
// Leaderboard Tests
// =============================================================================

#[tokio::test]
async fn test_leaderboard_default_limit_and_stats() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    for identity in ["alice", "alice", "bob"] {
        let request = json_request(
            "POST",
            "/api/submit-pattern",
            json!({ "coordinates": pattern(80), "contributorIdentity": identity }),
        );
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(get_request("/api/leaderboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);

    let board = body["data"]["leaderboard"].as_array().unwrap();
    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["identity"], "alice");
    assert_eq!(board[0]["contributionCount"], 2);
    assert_eq!(board[1]["identity"], "bob");

    let stats = &body["data"]["stats"];
    assert_eq!(stats["total_submissions"], 3);
    assert_eq!(stats["total_contributors"], 2);
    assert_eq!(stats["recent_submissions"], 3);
}

#[tokio::test]
async fn test_leaderboard_hides_opted_out() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let request = json_request(
        "POST",
        "/api/submit-pattern",
        json!({
            "coordinates": pattern(80),
            "contributorIdentity": "carol",
            "leaderboardOptOut": true
        }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get_request("/api/leaderboard?limit=5")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["data"]["leaderboard"].as_array().unwrap().is_empty());
    // Still counted as a contributor
    assert_eq!(body["data"]["stats"]["total_contributors"], 1);
}

#[tokio::test]
async fn test_leaderboard_limit_out_of_range() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    for uri in ["/api/leaderboard?limit=0", "/api/leaderboard?limit=101"] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }

    let response = app
        .oneshot(get_request("/api/leaderboard?limit=100"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_leaderboard_non_numeric_limit() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(get_request("/api/leaderboard?limit=ten"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Admin Tests
// =============================================================================

#[tokio::test]
async fn test_admin_requires_token() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let response = app.clone().oneshot(admin_request("GET", None, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(admin_request("GET", Some("wrong"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_disabled_without_configured_token() {
    let (_dir, db) = setup_test_db().await;
    let app = build_router(AppState::new(db, 32, None));

    let response = app
        .oneshot(admin_request("GET", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_stats() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db);

    let request = json_request(
        "POST",
        "/api/submit-pattern",
        json!({ "coordinates": pattern(80), "contributorIdentity": "alice" }),
    );
    app.clone().oneshot(request).await.unwrap();

    let response = app
        .oneshot(admin_request("GET", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let stats = &body["stats"];
    assert_eq!(stats["total_submissions"], 1);
    assert_eq!(stats["total_contributors"], 1);
    assert!(stats["database_size_kb"].as_i64().unwrap() > 0);
    assert!(stats["oldest_submission"].is_string());
    assert_eq!(stats["oldest_submission"], stats["newest_submission"]);
}

#[tokio::test]
async fn test_admin_reset() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    for identity in ["alice", "bob"] {
        let request = json_request(
            "POST",
            "/api/submit-pattern",
            json!({ "coordinates": pattern(90), "contributorIdentity": identity }),
        );
        app.clone().oneshot(request).await.unwrap();
    }

    let response = app
        .clone()
        .oneshot(admin_request("POST", Some(ADMIN_TOKEN), Some(json!({ "action": "reset" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);

    let response = app
        .oneshot(admin_request("GET", Some(ADMIN_TOKEN), None))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["stats"]["total_submissions"], 0);
    assert_eq!(body["stats"]["total_contributors"], 0);
    assert!(body["stats"]["oldest_submission"].is_null());

    assert!(ledger::get_leaderboard(&db, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_unsupported_action() {
    let (_dir, db) = setup_test_db().await;
    let app = setup_app(db.clone());

    let request = json_request(
        "POST",
        "/api/submit-pattern",
        json!({ "coordinates": pattern(80) }),
    );
    app.clone().oneshot(request).await.unwrap();

    let response = app
        .oneshot(admin_request("POST", Some(ADMIN_TOKEN), Some(json!({ "action": "drop" }))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing deleted
    assert_eq!(submissions::count_submissions(&db).await.unwrap(), 1);
}
