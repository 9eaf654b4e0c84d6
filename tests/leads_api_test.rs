//! End-to-end tests for the HTTP API over the in-memory store.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use lead_service::infrastructure::crypto::jwt::JwtConfig;
use lead_service::infrastructure::storage::{seed_demo_data, DEMO_EMAIL, DEMO_PASSWORD};
use lead_service::interfaces::http::modules::health::StoreMode;
use lead_service::{create_api_router, ApiContext, InMemoryRepositoryProvider};

fn app_with(provider: InMemoryRepositoryProvider) -> Router {
    create_api_router(ApiContext {
        repos: Arc::new(provider),
        jwt_config: JwtConfig::new("test-secret", 1),
        cookie_name: "auth-token".into(),
        secure_cookie: false,
        environment: "test".into(),
        mode: StoreMode::Demo,
        db: None,
        frontend_url: "http://localhost:3000".into(),
        metrics: None,
    })
}

fn app() -> Router {
    app_with(InMemoryRepositoryProvider::new())
}

struct Reply {
    status: StatusCode,
    body: Value,
    cookie: Option<String>,
}

async fn send(app: &Router, method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Reply {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(String::from);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    Reply { status, body, cookie }
}

/// Register an account and return its session cookie (`auth-token=...`).
async fn register(app: &Router, email: &str) -> String {
    let reply = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "secret123",
            "first_name": "Test",
            "last_name": "User"
        })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.cookie.expect("session cookie")
}

fn lead_body(email: &str, score: i32) -> Value {
    json!({
        "first_name": "Emily",
        "last_name": "Davis",
        "email": email,
        "company": "Health Plus",
        "city": "Chicago",
        "source": "referral",
        "status": "new",
        "score": score,
        "lead_value": 4200.25
    })
}

async fn create_lead(app: &Router, cookie: &str, email: &str, score: i32) -> Value {
    let reply = send(app, Method::POST, "/api/leads", Some(cookie), Some(lead_body(email, score))).await;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.body);
    reply.body["data"]["lead"].clone()
}

// -----------------------------------------------------------------------
// Sessions
// -----------------------------------------------------------------------

#[tokio::test]
async fn leads_require_a_session() {
    let app = app();
    let reply = send(&app, Method::GET, "/api/leads", None, None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "Access token required");

    let reply = send(&app, Method::GET, "/api/leads", Some("auth-token=garbage"), None).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["error"], "Invalid token");
}

#[tokio::test]
async fn register_login_me_logout() {
    let app = app();
    let cookie = register(&app, "owner@example.com").await;

    let me = send(&app, Method::GET, "/api/auth/me", Some(&cookie), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["user"]["email"], "owner@example.com");
    assert!(me.body["data"]["user"].get("password_hash").is_none());

    let dup = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "owner@example.com",
            "password": "secret123",
            "first_name": "Test",
            "last_name": "User"
        })),
    )
    .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);

    let bad = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "owner@example.com", "password": "wrong-pass"})),
    )
    .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);

    let login = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "owner@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["message"], "Login successful");
    assert!(login.cookie.is_some());

    let logout = send(&app, Method::POST, "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Logout successful");
}

#[tokio::test]
async fn bearer_token_is_accepted() {
    let app = app();
    let reply = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "bearer@example.com",
            "password": "secret123",
            "first_name": "Bear",
            "last_name": "Er"
        })),
    )
    .await;
    let token = reply.body["data"]["token"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri("/api/leads")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -----------------------------------------------------------------------
// Lead CRUD
// -----------------------------------------------------------------------

#[tokio::test]
async fn duplicate_email_is_rejected_per_owner() {
    let app = app();
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    create_lead(&app, &alice, "a@x.com", 50).await;

    let again = send(&app, Method::POST, "/api/leads", Some(&alice), Some(lead_body("a@x.com", 50))).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["error"], "Lead with this email already exists");

    create_lead(&app, &bob, "a@x.com", 50).await;
}

#[tokio::test]
async fn create_then_fetch_returns_same_fields() {
    let app = app();
    let cookie = register(&app, "owner@example.com").await;
    let created = create_lead(&app, &cookie, "emily@example.com", 68).await;
    assert_eq!(created["lead_value"], json!(4200.25));
    assert_eq!(created["is_qualified"], json!(false));

    let id = created["id"].as_i64().unwrap();
    let fetched = send(&app, Method::GET, &format!("/api/leads/{id}"), Some(&cookie), None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["lead"], created);
}

#[tokio::test]
async fn create_reports_every_validation_message() {
    let app = app();
    let cookie = register(&app, "owner@example.com").await;

    let reply = send(
        &app,
        Method::POST,
        "/api/leads",
        Some(&cookie),
        Some(json!({"first_name": "E", "email": "not-an-email", "score": 150})),
    )
    .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "Validation Error");
    let details: Vec<&str> = reply.body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(details.contains(&"Please provide a valid email address"));
    assert!(details.contains(&"Score must be between 0 and 100"));
    assert!(details.contains(&"Last name is required"));
    assert!(details.contains(&"First name must be at least 2 characters long"));
}

#[tokio::test]
async fn update_checks_existence_before_body() {
    let app = app();
    let cookie = register(&app, "owner@example.com").await;

    let missing = send(
        &app,
        Method::PUT,
        "/api/leads/999",
        Some(&cookie),
        Some(json!({"score": 500})),
    )
    .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"], "Lead not found");

    let lead = create_lead(&app, &cookie, "emily@example.com", 68).await;
    let uri = format!("/api/leads/{}", lead["id"]);

    let empty = send(&app, Method::PUT, &uri, Some(&cookie), Some(json!({}))).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"], "No fields to update");

    let invalid = send(&app, Method::PUT, &uri, Some(&cookie), Some(json!({"score": 500}))).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let body = json!({"status": "qualified", "score": 90});
    let first = send(&app, Method::PUT, &uri, Some(&cookie), Some(body.clone())).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["message"], "Lead updated successfully");
    let second = send(&app, Method::PUT, &uri, Some(&cookie), Some(body)).await;

    let mut a = first.body["data"]["lead"].clone();
    let mut b = second.body["data"]["lead"].clone();
    a["updated_at"] = Value::Null;
    b["updated_at"] = Value::Null;
    assert_eq!(a, b);
    assert_eq!(a["status"], "qualified");
    assert_eq!(a["company"], "Health Plus");
}

#[tokio::test]
async fn delete_of_another_owners_lead_is_not_found() {
    let app = app();
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let lead = create_lead(&app, &alice, "a@x.com", 50).await;
    let uri = format!("/api/leads/{}", lead["id"]);

    let reply = send(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(&app, Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let reply = send(&app, Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["id"], lead["id"]);
    assert_eq!(reply.body["message"], "Lead deleted successfully");
}

#[tokio::test]
async fn non_integer_ids_get_a_json_error() {
    let app = app();
    let cookie = register(&app, "owner@example.com").await;

    for (method, uri) in [
        (Method::GET, "/api/leads/abc"),
        (Method::DELETE, "/api/leads/99999999999"),
        (Method::PUT, "/api/leads/1.5"),
    ] {
        let body = (method == Method::PUT).then(|| json!({"score": 10}));
        let reply = send(&app, method, uri, Some(&cookie), body).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(reply.body["success"], false, "{uri}");
        assert_eq!(reply.body["error"], "Validation Error");
        assert_eq!(reply.body["details"], json!(["ID must be an integer"]));
    }
}

#[tokio::test]
async fn oversized_lead_value_is_rejected() {
    let app = app();
    let cookie = register(&app, "owner@example.com").await;

    let mut body = lead_body("big@example.com", 50);
    body["lead_value"] = json!(1e28);
    let reply = send(&app, Method::POST, "/api/leads", Some(&cookie), Some(body)).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["details"], json!(["Lead value is too large"]));

    let lead = create_lead(&app, &cookie, "small@example.com", 50).await;
    let uri = format!("/api/leads/{}", lead["id"]);
    let reply = send(&app, Method::PUT, &uri, Some(&cookie), Some(json!({"lead_value": 1e20}))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(
        &app,
        Method::GET,
        "/api/leads?lead_value_min=79228162514264337593543950335",
        Some(&cookie),
        None,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["pagination"]["total"], 0);
}

// -----------------------------------------------------------------------
// Listing
// -----------------------------------------------------------------------

#[tokio::test]
async fn listing_paginates_and_filters() {
    let app = app();
    let cookie = register(&app, "owner@example.com").await;
    let other = register(&app, "other@example.com").await;
    for (i, score) in [10, 80, 85, 90, 95].into_iter().enumerate() {
        create_lead(&app, &cookie, &format!("lead{i}@example.com"), score).await;
    }
    create_lead(&app, &other, "foreign@example.com", 85).await;

    let reply = send(&app, Method::GET, "/api/leads?page=3&limit=2", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(
        reply.body["pagination"],
        json!({"page": 3, "limit": 2, "total": 5, "totalPages": 3})
    );
    assert_eq!(reply.body["data"].as_array().unwrap().len(), 1);

    let reply = send(
        &app,
        Method::GET,
        "/api/leads?score_min=80&score_max=90&sort_by=score&sort_order=asc",
        Some(&cookie),
        None,
    )
    .await;
    let scores: Vec<i64> = reply.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["score"].as_i64().unwrap())
        .collect();
    assert_eq!(scores, vec![80, 85, 90]);
    assert_eq!(reply.body["pagination"]["total"], 3);
}

#[tokio::test]
async fn listing_rejects_unknown_and_invalid_parameters() {
    let app = app();
    let cookie = register(&app, "owner@example.com").await;

    let reply = send(&app, Method::GET, "/api/leads?foo=1&limit=500", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["error"], "Validation Error");
    let details = reply.body["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d == "foo is not allowed"));
    assert_eq!(details.len(), 2);

    let reply = send(&app, Method::GET, "/api/leads?sort_by=password", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn demo_seed_is_served_to_demo_account() {
    let provider = InMemoryRepositoryProvider::new();
    seed_demo_data(&provider).await.unwrap();
    let app = app_with(provider);

    let login = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": DEMO_EMAIL, "password": DEMO_PASSWORD})),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let cookie = login.cookie.unwrap();

    let reply = send(&app, Method::GET, "/api/leads?status[]=new&status[]=won", Some(&cookie), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    for lead in reply.body["data"].as_array().unwrap() {
        assert!(lead["status"] == "new" || lead["status"] == "won");
    }

    let all = send(&app, Method::GET, "/api/leads", Some(&cookie), None).await;
    assert_eq!(all.body["pagination"]["total"], 10);
}

// -----------------------------------------------------------------------
// Misc
// -----------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app();
    let reply = send(&app, Method::GET, "/api/nothing-here", None, None).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(
        reply.body,
        json!({"success": false, "error": "Route not found", "path": "/api/nothing-here"})
    );
}

#[tokio::test]
async fn health_reports_demo_mode() {
    let app = app();
    let reply = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["status"], "OK");
    assert_eq!(reply.body["mode"], "demo");
    assert_eq!(reply.body["environment"], "test");
}
