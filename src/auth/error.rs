// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Every pipeline rejection maps to a 401 with a `{"error": "..."}` body.
/// The response text is deliberately coarse; the variant itself (and the
/// log line written where it was raised) carries the precise cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable `Authorization: Bearer <token>` header
    MissingCredential,
    /// Token cannot be parsed
    MalformedToken,
    /// Token signature does not verify
    BadSignature,
    /// Token is past its expiry
    Expired,
    /// Token was explicitly revoked (logout)
    Revoked,
    /// Token subject no longer exists in the user directory
    UnknownSubject,
    /// Login with an unknown username or a wrong password
    BadCredential,
    /// Authenticated, but the token lacks the required role
    InsufficientRole,
    /// Internal error (details are logged, never returned)
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
}

impl AuthError {
    /// Get the error code for this error (used in logs).
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedToken => "malformed_token",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "expired",
            AuthError::Revoked => "revoked",
            AuthError::UnknownSubject => "unknown_subject",
            AuthError::BadCredential => "bad_credential",
            AuthError::InsufficientRole => "insufficient_role",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::MalformedToken
            | AuthError::BadSignature
            | AuthError::Expired
            | AuthError::Revoked
            | AuthError::UnknownSubject
            | AuthError::BadCredential => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientRole => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingCredential => write!(f, "Missing or invalid Authorization header"),
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::BadSignature => write!(f, "Token signature is invalid"),
            AuthError::Expired => write!(f, "Token has expired"),
            AuthError::Revoked => write!(f, "Token is invalid or blacklisted"),
            // Same text a stale or forged token would get, so the response
            // never confirms whether an account exists.
            AuthError::UnknownSubject => write!(f, "Invalid or expired token"),
            AuthError::BadCredential => write!(f, "Invalid username or password"),
            AuthError::InsufficientRole => {
                write!(f, "Insufficient permissions for this operation")
            }
            AuthError::Internal(_) => write!(f, "Internal authentication error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(detail) = &self {
            tracing::error!(detail = %detail, "Internal authentication error");
        }
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
