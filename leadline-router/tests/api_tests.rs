//! Integration tests for the leadline-router HTTP API
//!
//! Exercises the full router (handlers, envelope, error mapping) with
//! tower's `oneshot` against a scratch database.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use leadline_router::{build_router, AppState};

struct TestApp {
    router: Router,
    // Held so the database file outlives the test
    _dir: TempDir,
}

/// Test helper: scratch database + full router
async fn setup_app() -> TestApp {
    let dir = TempDir::new().expect("tempdir");
    let pool: SqlitePool = leadline_common::db::init_database(&dir.path().join("leadline.db"))
        .await
        .expect("init database");
    TestApp {
        router: build_router(AppState::new(pool)),
        _dir: dir,
    }
}

/// Test helper: JSON request
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: bodyless request
fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse JSON")
}

/// Test helper: create a caller, returning its id
async fn create_caller(app: &TestApp, name: &str, daily_limit: i64, states: Value) -> String {
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/callers",
            json!({
                "name": name,
                "role": "agent",
                "dailyLimit": daily_limit,
                "assignedStates": states,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response.into_body()).await;
    body["data"]["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = setup_app().await;

    for uri in ["/", "/health"] {
        let response = app.router.clone().oneshot(request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["module"], "leadline-router");
    }
}

// =============================================================================
// Caller administration
// =============================================================================

#[tokio::test]
async fn caller_crud_round_trip() {
    let app = setup_app().await;
    let id = create_caller(&app, "Asha", 3, json!(["Delhi"])).await;

    // List shows the caller with the envelope count
    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/callers"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["todayAssignedCount"], 0);

    // Update administrative fields
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/callers/{}", id),
            json!({ "name": "Asha K", "dailyLimit": 5 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["name"], "Asha K");
    assert_eq!(body["data"]["dailyLimit"], 5);

    // Delete, then the list is empty
    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", &format!("/api/callers/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(request("GET", "/api/callers"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn malformed_caller_input_is_rejected() {
    let app = setup_app().await;

    // Empty name
    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/callers", json!({ "name": "  " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);

    // Negative daily limit
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/callers",
            json!({ "name": "Bad", "dailyLimit": -1 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updating_unknown_caller_is_not_found() {
    let app = setup_app().await;
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/callers/{}", uuid::Uuid::new_v4()),
            json!({ "name": "Ghost" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Lead ingestion
// =============================================================================

#[tokio::test]
async fn ingested_lead_is_assigned_and_joined_to_caller() {
    let app = setup_app().await;
    let caller_id = create_caller(&app, "Ravi", 2, json!(["Delhi"])).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/leads",
            json!({
                "name": "Lead One",
                "phone": "555-0101",
                "leadSource": "web",
                "state": "Delhi",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["assignedCallerId"], caller_id);
    assert_eq!(body["data"]["assignedCaller"]["name"], "Ravi");
    assert!(body["data"]["assignedAt"].is_string());
}

#[tokio::test]
async fn ingestion_without_eligible_caller_is_unprocessable() {
    let app = setup_app().await;
    // Only caller covers a different state
    create_caller(&app, "Ravi", 2, json!(["Mumbai"])).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/leads",
            json!({ "name": "Lead", "phone": "555-0102", "state": "Delhi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_lead_is_rejected_without_side_effects() {
    let app = setup_app().await;
    create_caller(&app, "Ravi", 2, json!([])).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/leads",
            json!({ "name": "Lead", "phone": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // No counter moved, no lead stored
    let body = extract_json(
        app.router
            .clone()
            .oneshot(request("GET", "/api/callers"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["data"][0]["todayAssignedCount"], 0);

    let body = extract_json(
        app.router
            .clone()
            .oneshot(request("GET", "/api/leads"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["count"], 0);
}

// =============================================================================
// Status surface
// =============================================================================

#[tokio::test]
async fn status_transitions_and_active_filter() {
    let app = setup_app().await;
    create_caller(&app, "Ravi", 0, json!([])).await;

    // Two leads in
    let mut lead_ids = Vec::new();
    for name in ["L1", "L2"] {
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/leads",
                json!({ "name": name, "phone": "555-0100" }),
            ))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        lead_ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    // Complete the first
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/leads/{}/status", lead_ids[0]),
            json!({ "status": "completed" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"]["status"], "completed");

    // Active list only holds the second
    let body = extract_json(
        app.router
            .clone()
            .oneshot(request("GET", "/api/leads/active"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], lead_ids[1].as_str());

    // Full list still holds both
    let body = extract_json(
        app.router
            .clone()
            .oneshot(request("GET", "/api/leads"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn unknown_status_value_is_rejected() {
    let app = setup_app().await;
    create_caller(&app, "Ravi", 0, json!([])).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/leads",
            json!({ "name": "L", "phone": "555-0100" }),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/leads/{}/status", id),
            json!({ "status": "answered" }),
        ))
        .await
        .unwrap();
    // Serde rejects the unknown enum value during extraction
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deleting_a_caller_clears_lead_references() {
    let app = setup_app().await;
    let caller_id = create_caller(&app, "Ravi", 0, json!([])).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/leads",
            json!({ "name": "L", "phone": "555-0100" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", &format!("/api/callers/{}", caller_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The lead survives with its caller reference nulled out
    let body = extract_json(
        app.router
            .clone()
            .oneshot(request("GET", "/api/leads"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    assert_eq!(body["count"], 1);
    assert!(body["data"][0]["assignedCallerId"].is_null());
    assert!(body["data"][0]["assignedCaller"].is_null());
}

#[tokio::test]
async fn deleting_a_lead_twice_is_not_found() {
    let app = setup_app().await;
    create_caller(&app, "Ravi", 0, json!([])).await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/leads",
            json!({ "name": "L", "phone": "555-0100" }),
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", &format!("/api/leads/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(request("DELETE", &format!("/api/leads/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
