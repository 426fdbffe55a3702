// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end request flows through the full router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header::AUTHORIZATION, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::task::JoinSet;
use tower::ServiceExt;

use finance_auth_server::api::router;
use finance_auth_server::clock::ManualClock;
use finance_auth_server::config::{AuthSettings, BootstrapAdmin};
use finance_auth_server::state::AppState;
use finance_auth_server::store::InMemoryUserDirectory;

const SECRET: &str = "integration-test-secret-of-32-bytes-plus";
const T0: i64 = 1_700_000_000;
const TTL: i64 = 3600;

struct TestApp {
    router: Router,
    state: AppState,
    clock: Arc<ManualClock>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_settings(AuthSettings::with_secret(SECRET).with_bcrypt_cost(4))
    }

    fn with_settings(settings: AuthSettings) -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let state = AppState::new(
            &settings,
            Arc::new(InMemoryUserDirectory::new()),
            clock.clone(),
        )
        .unwrap();
        Self {
            router: router(state.clone()),
            state,
            clock,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(self.router.clone(), request).await
    }

    async fn register(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.send(post_json(
            "/auth/register",
            json!({
                "username": username,
                "password": password,
                "email": format!("{username}@example.com"),
            }),
        ))
        .await
    }

    async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.send(post_json(
            "/auth/login",
            json!({ "username": username, "password": password }),
        ))
        .await
    }

    async fn token_for(&self, username: &str, password: &str) -> String {
        let (status, _) = self.register(username, password).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = self.login(username, password).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn with_bearer(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn login_me_logout_then_token_is_dead() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret123").await;

    let (status, body) = app.send(with_bearer("GET", "/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password_hash").is_none());

    let (status, _) = app.send(with_bearer("POST", "/auth/logout", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(with_bearer("GET", "/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token is invalid or blacklisted" }));
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = TestApp::new();
    let (status, body) = app.send(with_bearer("GET", "/auth/me", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token is malformed" }));
}

#[tokio::test]
async fn missing_header_is_rejected() {
    let app = TestApp::new();
    let request = Request::get("/auth/me").body(Body::empty()).unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Missing or invalid Authorization header" }));
}

#[tokio::test]
async fn token_expires_at_exp() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret123").await;

    app.clock.set(T0 + TTL - 1);
    let (status, _) = app.send(with_bearer("GET", "/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);

    app.clock.set(T0 + TTL);
    let (status, body) = app.send(with_bearer("GET", "/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token has expired" }));
}

#[tokio::test]
async fn configured_ttl_bounds_token_lifetime() {
    let settings = AuthSettings::with_secret(SECRET)
        .with_bcrypt_cost(4)
        .with_token_ttl(Duration::from_secs(60));
    let app = TestApp::with_settings(settings);
    let token = app.token_for("alice", "secret123").await;

    app.clock.set(T0 + 59);
    let (status, _) = app.send(with_bearer("GET", "/auth/me", &token)).await;
    assert_eq!(status, StatusCode::OK);

    app.clock.set(T0 + 60);
    let (status, body) = app.send(with_bearer("GET", "/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Token has expired" }));
}

#[tokio::test]
async fn login_failures_are_uniform() {
    let app = TestApp::new();
    app.token_for("alice", "secret123").await;

    let wrong_password = app.login("alice", "not-the-password").await;
    let unknown_user = app.login("mallory", "secret123").await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
    assert_eq!(
        wrong_password.1,
        json!({ "error": "Invalid username or password" })
    );
}

#[tokio::test]
async fn duplicate_registration_is_generic_400() {
    let app = TestApp::new();
    app.register("alice", "secret123").await;

    let (status, body) = app.register("alice", "another-pass").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Registration failed" }));
}

#[tokio::test]
async fn logout_is_idempotent_and_tolerates_garbage() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret123").await;

    for _ in 0..2 {
        let (status, _) = app.send(with_bearer("POST", "/auth/logout", &token)).await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(app.state.revocations.len(), 1);

    let (status, _) = app.send(with_bearer("POST", "/auth/logout", "garbage")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.state.revocations.len(), 1);

    let request = Request::post("/auth/logout").body(Body::empty()).unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Authorization header is missing or invalid" })
    );
}

#[tokio::test]
async fn deleted_account_token_stops_resolving() {
    let directory = Arc::new(InMemoryUserDirectory::new());
    let settings = AuthSettings::with_secret(SECRET).with_bcrypt_cost(4);
    let state = AppState::new(&settings, directory.clone(), Arc::new(ManualClock::new(T0))).unwrap();
    let app = router(state);

    send(
        app.clone(),
        post_json(
            "/auth/register",
            json!({ "username": "bob", "password": "secret123", "email": "bob@example.com" }),
        ),
    )
    .await;
    let (_, body) = send(
        app.clone(),
        post_json("/auth/login", json!({ "username": "bob", "password": "secret123" })),
    )
    .await;
    let token = body["token"].as_str().unwrap().to_string();

    directory.remove("bob");
    let (status, body) = send(app, with_bearer("GET", "/auth/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid or expired token" }));
}

#[tokio::test]
async fn admin_route_requires_admin_role() {
    let app = TestApp::new();
    let user_token = app.token_for("alice", "secret123").await;

    let (status, body) = app
        .send(with_bearer("GET", "/admin/revocations", &user_token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body,
        json!({ "error": "Insufficient permissions for this operation" })
    );

    app.state
        .seed_admin(&BootstrapAdmin {
            username: "root".to_string(),
            password: "root-password".to_string(),
            email: "root@example.com".to_string(),
        })
        .await
        .unwrap();
    let (_, body) = app.login("root", "root-password").await;
    let admin_token = body["token"].as_str().unwrap().to_string();

    app.send(with_bearer("POST", "/auth/logout", &user_token)).await;
    let (status, body) = app
        .send(with_bearer("GET", "/admin/revocations", &admin_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "active_entries": 1 }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_logouts_then_every_request_is_rejected() {
    let app = TestApp::new();
    let token = app.token_for("alice", "secret123").await;

    let mut logouts = JoinSet::new();
    for _ in 0..2 {
        let router = app.router.clone();
        let request = with_bearer("POST", "/auth/logout", &token);
        logouts.spawn(async move { send(router, request).await });
    }
    while let Some(result) = logouts.join_next().await {
        assert_eq!(result.unwrap().0, StatusCode::OK);
    }

    let mut requests = JoinSet::new();
    for _ in 0..1000 {
        let router = app.router.clone();
        let request = with_bearer("GET", "/auth/me", &token);
        requests.spawn(async move { send(router, request).await });
    }

    let mut rejected = 0;
    while let Some(result) = requests.join_next().await {
        let (status, body) = result.unwrap();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token is invalid or blacklisted");
        rejected += 1;
    }
    assert_eq!(rejected, 1000);
}
