// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints: register, login, logout and the current identity.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    Json,
};

use crate::{
    auth::{pipeline::bearer_token, Auth, AuthError, LogoutOutcome},
    error::ApiError,
    models::{LoginRequest, MessageResponse, RegisterRequest, TokenResponse, UserProfile},
    state::AppState,
};

/// Create an account with the `USER` role.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Invalid input or registration rejected"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), ApiError> {
    let record = state
        .service
        .register(&request.username, &request.password, &request.email)
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

/// Exchange username and password for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Invalid username or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AuthError> {
    let now = state.clock.now();
    let token = state
        .service
        .login(&request.username, &request.password, now)
        .await?;
    Ok(Json(TokenResponse { token }))
}

/// Revoke the presented token.
///
/// Public so that repeated or concurrent logouts with the same token all
/// succeed. A token that does not decode is accepted and ignored.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Authorization header is missing or invalid"),
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header)
        .map_err(|_| ApiError::bad_request("Authorization header is missing or invalid"))?;

    let message = match state.service.logout(token) {
        LogoutOutcome::Revoked { .. } => "Logged out successfully",
        LogoutOutcome::NothingToRevoke => "Logged out",
    };
    Ok(Json(MessageResponse::new(message)))
}

/// Get the current authenticated user's account.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current account", body = UserProfile),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<UserProfile>, AuthError> {
    let record = state
        .directory
        .find_by_username(&ctx.username)
        .map_err(|e| AuthError::Internal(format!("user lookup failed: {e}")))?
        .ok_or(AuthError::UnknownSubject)?;
    Ok(Json(record.into()))
}
