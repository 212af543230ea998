//! Shared helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use hostelcare_api::auth::jwt::{issue_access_token, JwtConfig, RefreshToken};
use hostelcare_api::auth::password::hash_password;
use hostelcare_api::config::ServerConfig;
use hostelcare_api::router::build_app_router;
use hostelcare_api::state::AppState;
use hostelcare_core::roles::ActorRole;
use hostelcare_db::models::user::{CreateUser, User};
use hostelcare_db::repositories::{SessionRepo, UserRepo};

/// Password given to every user created by [`seed_user`].
pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 30,
            refresh_token_expiry_days: 7,
            session_idle_mins: 30,
        },
        bootstrap_admin: None,
    }
}

/// Build the full application router (same middleware stack as production).
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

/// Insert a user with the given role name and [`TEST_PASSWORD`].
pub async fn seed_user(pool: &PgPool, username: &str, role: &str) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@test.com"),
            password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
            full_name: None,
            role: ActorRole::from_name(role).expect("known role"),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Open a session for `user` and mint an access token bound to it,
/// skipping the login round-trip.
pub async fn token_for(pool: &PgPool, user: &User) -> String {
    let config = test_config().jwt;
    let refresh = RefreshToken::generate();
    let session = SessionRepo::open(pool, user.id, &refresh.hash, config.refresh_expires_at())
        .await
        .expect("session should open");
    issue_access_token(user.id, user.role, session.id, &config).expect("token generation")
}

/// Push the last activity of every session of `user_id` back by `minutes`.
pub async fn age_sessions(pool: &PgPool, user_id: i64, minutes: i32) {
    sqlx::query(
        "UPDATE user_sessions
         SET last_active_at = last_active_at - make_interval(mins => $2)
         WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(minutes)
    .execute(pool)
    .await
    .expect("sessions should age");
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
