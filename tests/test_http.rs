mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use helpers::*;
use limehub::{
    api::router::build_router,
    bootstrap::build_app_state,
    config::Config,
    models::Session,
    services::{generate_session_token, AuthService},
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        session_duration_hours: 24,
        google_client_id: String::new(),
        google_client_secret: String::new(),
        google_redirect_url: String::new(),
        login_success_url: "/login/success".to_string(),
        login_failure_url: "/login".to_string(),
    }
}

fn build_app(test_db: &TestDb) -> Router {
    build_router(build_app_state(test_db.db().clone(), &test_config()))
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

#[tokio::test]
async fn test_health_endpoint() {
    let test_db = setup_test_db().await;
    let app = build_app(&test_db);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_tenant_routes_require_a_bearer_token() {
    let test_db = setup_test_db().await;
    let app = build_app(&test_db);

    // No Authorization header
    let response = app
        .clone()
        .oneshot(Request::get("/segments").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["message"], "Unauthorized");

    // Wrong scheme
    let response = app
        .clone()
        .oneshot(
            Request::get("/segments")
                .header(header::AUTHORIZATION, "Basic abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Token that resolves to no session
    let response = app
        .oneshot(
            Request::get("/segments")
                .header(header::AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_expired_session_is_rejected_and_deleted() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "Acme").await;
    let user = seed_user(test_db.db(), &org.id, "jordan@example.com", "hunter42").await;

    let expired = Session::new(user.id.clone(), generate_session_token(), -1);
    test_db.db().create_session(&expired).await.unwrap();

    let app = build_app(&test_db);
    let response = app
        .oneshot(
            Request::get("/segments")
                .header(header::AUTHORIZATION, format!("Bearer {}", expired.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The middleware removed the stale session on sight
    assert!(test_db
        .db()
        .get_session_by_token(&expired.token)
        .await
        .unwrap()
        .is_none());

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_valid_session_reaches_tenant_routes() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "Acme").await;
    let user = seed_user(test_db.db(), &org.id, "jordan@example.com", "hunter42").await;

    let auth_service = AuthService::new(test_db.db().clone(), 24);
    let auth = auth_service.issue_session(&user).await.unwrap();

    let app = build_app(&test_db);

    // Empty listing still comes back as a success envelope
    let response = app
        .clone()
        .oneshot(
            Request::get("/segments")
                .header(header::AUTHORIZATION, format!("Bearer {}", auth.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["message"], "Segments retrieved successfully");

    // Create flows through handler, service and store
    let response = app
        .oneshot(
            Request::post("/segments")
                .header(header::AUTHORIZATION, format!("Bearer {}", auth.token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "name": "VIP" })).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["name"], "VIP");
    assert_eq!(body["data"]["organization_id"], org.id.as_str());
    assert_eq!(body["message"], "Segment created successfully");

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_authenticate_signals_through_the_http_status() {
    let test_db = setup_test_db().await;
    let org = seed_organization(test_db.db(), "Acme").await;
    seed_user(test_db.db(), &org.id, "jordan@example.com", "hunter42").await;

    let app = build_app(&test_db);

    let authenticate = |payload: Value| {
        Request::post("/auth/authenticate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&payload).unwrap()))
            .unwrap()
    };

    // Bad credentials: 400 with an error envelope
    let response = app
        .clone()
        .oneshot(authenticate(json!({
            "email": "jordan@example.com",
            "password": "wrong"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["message"], "Invalid email or password");

    // Missing fields: also 400
    let response = app
        .clone()
        .oneshot(authenticate(json!({ "email": "", "password": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Email and password are required");

    // Valid credentials: 200 with a token
    let response = app
        .oneshot(authenticate(json!({
            "email": "jordan@example.com",
            "password": "hunter42"
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Authentication successful");
    assert!(body["data"]["token"].as_str().is_some_and(|t| t.len() == 64));
    assert_eq!(body["data"]["user"]["email"], "jordan@example.com");

    teardown_test_db(test_db).await;
}
