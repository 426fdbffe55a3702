// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Runs the [`AuthPipeline`](super::AuthPipeline) in front of every route and
//! publishes the resulting [`AuthContext`](super::AuthContext) into request
//! extensions, where the extractors in `extractor.rs` pick it up.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/auth/me", get(me))
//!     .layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware))
//!     .with_state(state);
//! ```

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::error::AuthError;
use super::pipeline::Verdict;
use crate::state::AppState;

/// Authentication middleware function.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let now = state.clock.now();

    // A header with non-visible-ASCII bytes is treated as absent.
    let verdict = state.pipeline.evaluate(
        request.uri().path(),
        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok()),
        now,
    );

    match verdict {
        Ok(Verdict::Bypass) => next.run(request).await,
        Ok(Verdict::Authenticated(context)) => {
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(e) => {
            log_rejection(&request, &e);
            e.into_response()
        }
    }
}

fn log_rejection(request: &Request, error: &AuthError) {
    let method = request.method().as_str();
    let path = request.uri().path();
    match error {
        AuthError::BadSignature | AuthError::UnknownSubject => {
            warn!(method, path, reason = error.error_code(), "Request rejected");
        }
        AuthError::Internal(_) => {}
        _ => debug!(method, path, reason = error.error_code(), "Request rejected"),
    }
}
