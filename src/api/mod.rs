// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::Request,
    http::HeaderName,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{middleware::auth_middleware, AuthContext},
    models::{
        LoginRequest, MessageResponse, RegisterRequest, RevocationStats, TokenResponse,
        UserProfile,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod health;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Build the application router.
///
/// Layers, outermost first: CORS, request id, tracing, authentication.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/admin/revocations", get(admin::revocation_stats))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        admin::revocation_stats
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            UserProfile,
            MessageResponse,
            RevocationStats,
            AuthContext,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and logout"),
        (name = "Admin", description = "Operational endpoints for administrators"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
