//! HTTP-level integration tests for registration, login and the bearer-token gate.

mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::{
    body_json, count_rows, expect_json, get_auth, post_json, post_json_auth, register_and_login,
    send, setup, PASSWORD, TEST_SECRET,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

fn alice() -> serde_json::Value {
    json!({
        "name": "Alice",
        "username": "alice",
        "email": "alice@example.com",
        "password": PASSWORD,
    })
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_returns_user_without_credentials() {
    let (app, _pool) = setup().await;

    let response = post_json(&app, "/api/auth/register", alice()).await;
    let json = expect_json(response, StatusCode::CREATED).await;

    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "User registered successfully");
    assert_eq!(json["data"]["username"], "alice");
    assert_eq!(json["data"]["email"], "alice@example.com");
    assert!(json["data"]["id"].is_i64());
    assert!(json["data"]["createdAt"].is_string());

    let text = json.to_string();
    assert!(!text.contains("password"), "credential leaked: {text}");
    assert!(!text.contains(PASSWORD));
}

#[tokio::test]
async fn register_conflict_names_email_before_username() {
    let (app, _pool) = setup().await;
    post_json(&app, "/api/auth/register", alice()).await;

    // Both email and username collide: email wins
    let response = post_json(&app, "/api/auth/register", alice()).await;
    let json = expect_json(response, StatusCode::CONFLICT).await;
    assert_eq!(json["message"], "Email already registered");
    assert_eq!(json["errors"], json!({ "email": "Already in use" }));

    // Only the username collides
    let mut body = alice();
    body["email"] = json!("other@example.com");
    let response = post_json(&app, "/api/auth/register", body).await;
    let json = expect_json(response, StatusCode::CONFLICT).await;
    assert_eq!(json["message"], "Username already taken");
    assert_eq!(json["errors"], json!({ "username": "Already in use" }));
}

#[tokio::test]
async fn register_reports_every_invalid_field() {
    let (app, pool) = setup().await;

    let response = post_json(
        &app,
        "/api/auth/register",
        json!({ "name": "", "username": "al", "email": "nope", "password": "123" }),
    )
    .await;
    let json = expect_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;

    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Validation failed");
    for field in ["name", "username", "email", "password"] {
        assert!(json["errors"][field].is_string(), "missing error for {field}");
    }
    assert_eq!(count_rows(&pool, "users").await, 0);
}

#[tokio::test]
async fn malformed_json_body_is_a_validation_error() {
    let (app, _pool) = setup().await;

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    let json = expect_json(response, StatusCode::UNPROCESSABLE_ENTITY).await;

    assert!(json["errors"]["body"].is_string());
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_returns_user_and_working_token() {
    let (app, _pool) = setup().await;
    post_json(&app, "/api/auth/register", alice()).await;

    let response = post_json(
        &app,
        "/api/auth/login",
        json!({ "username": "alice", "password": PASSWORD }),
    )
    .await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["message"], "Login successful");
    assert_eq!(json["data"]["user"]["username"], "alice");
    assert!(!json.to_string().contains("password"));

    let token = json["data"]["token"].as_str().unwrap();
    let profile = get_auth(&app, "/api/user/profile", token).await;
    assert_eq!(profile.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_user_and_wrong_password_are_indistinguishable() {
    let (app, _pool) = setup().await;
    post_json(&app, "/api/auth/register", alice()).await;

    let unknown = post_json(
        &app,
        "/api/auth/login",
        json!({ "username": "mallory", "password": PASSWORD }),
    )
    .await;
    let wrong = post_json(
        &app,
        "/api/auth/login",
        json!({ "username": "alice", "password": "not-the-password" }),
    )
    .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(unknown).await, body_json(wrong).await);
}

#[tokio::test]
async fn login_by_email_is_not_supported() {
    let (app, _pool) = setup().await;
    post_json(&app, "/api/auth/register", alice()).await;

    let response = post_json(
        &app,
        "/api/auth/login",
        json!({ "username": "alice@example.com", "password": PASSWORD }),
    )
    .await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["message"], "Invalid username or password");
}

// ---------------------------------------------------------------------------
// Token gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_or_garbled_tokens_never_reach_storage() {
    let (app, pool) = setup().await;
    let body = json!({ "title": "Secret", "content": "Should not be stored" });

    let response = send(&app, Method::POST, "/api/diaries", None, Some(body.clone())).await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["message"], "Authentication token required");

    let response = post_json_auth(&app, "/api/diaries", "garbage.token.value", body).await;
    let json = expect_json(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["message"], "Invalid or expired token");

    // Auth is checked before the body: an invalid body still yields 401
    let response = send(&app, Method::POST, "/api/diaries", None, Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(count_rows(&pool, "diaries").await, 0);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (app, _pool) = setup().await;
    let (_token, user_id) = register_and_login(&app, "alice").await;

    let expired = encode(
        &Header::default(),
        &json!({ "sub": user_id.to_string(), "exp": Utc::now().timestamp() - 7200 }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let json = expect_json(
        get_auth(&app, "/api/diaries", &expired).await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(json["message"], "Invalid or expired token");
}

#[tokio::test]
async fn token_without_user_id_is_rejected() {
    let (app, _pool) = setup().await;

    let token = encode(
        &Header::default(),
        &json!({ "username": "ghost", "exp": Utc::now().timestamp() + 600 }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let json = expect_json(
        get_auth(&app, "/api/tags", &token).await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(json["message"], "Invalid token payload");
}

#[tokio::test]
async fn legacy_id_claim_is_accepted() {
    let (app, _pool) = setup().await;
    let (_token, user_id) = register_and_login(&app, "alice").await;

    let token = encode(
        &Header::default(),
        &json!({ "id": user_id, "exp": Utc::now().timestamp() + 600 }),
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let json = expect_json(
        get_auth(&app, "/api/user/profile", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["id"], user_id);
}
