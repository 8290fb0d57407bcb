#![allow(dead_code)]

use std::str::FromStr;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tower::ServiceExt;

use diary_api::config::Config;
use diary_api::routes::{router, AppState};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "secret123";

/// Build a test `Config` with safe defaults.
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        max_connections: 1,
    }
}

/// Fresh in-memory database with all migrations applied.
///
/// A single connection that never expires: an in-memory SQLite database
/// lives only as long as its connection.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("in-memory database should open");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations should apply");
    pool
}

/// Build the full application router (same middleware stack as `main.rs`).
pub fn build_test_app(pool: SqlitePool) -> Router {
    router(AppState {
        pool,
        config: test_config(),
    })
}

/// Pool + router over it. The pool is kept for direct row counts.
pub async fn setup() -> (Router, SqlitePool) {
    let pool = test_pool().await;
    (build_test_app(pool.clone()), pool)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect the response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Assert the status and return the parsed envelope.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

/// Register `username` through the API and log in. Returns `(token, user_id)`.
pub async fn register_and_login(app: &Router, username: &str) -> (String, i64) {
    let register = post_json(
        app,
        "/api/auth/register",
        json!({
            "name": format!("{username} name"),
            "username": username,
            "email": format!("{username}@example.com"),
            "password": PASSWORD,
        }),
    )
    .await;
    let registered = expect_json(register, StatusCode::CREATED).await;
    let user_id = registered["data"]["id"].as_i64().unwrap();

    let login = post_json(
        app,
        "/api/auth/login",
        json!({ "username": username, "password": PASSWORD }),
    )
    .await;
    let logged_in = expect_json(login, StatusCode::OK).await;
    let token = logged_in["data"]["token"].as_str().unwrap().to_string();

    (token, user_id)
}

/// Create a tag through the API and return its id.
pub async fn create_tag(app: &Router, token: &str, name: &str) -> i64 {
    let response = post_json_auth(app, "/api/tags", token, json!({ "name": name })).await;
    let json = expect_json(response, StatusCode::CREATED).await;
    json["data"]["id"].as_i64().unwrap()
}

/// Create a diary through the API and return the `data` object.
pub async fn create_diary(app: &Router, token: &str, body: Value) -> Value {
    let response = post_json_auth(app, "/api/diaries", token, body).await;
    let json = expect_json(response, StatusCode::CREATED).await;
    json["data"].clone()
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}
