// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for the authenticated context.
//!
//! The middleware has already done the verification; these only read what it
//! left in the request extensions.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(ctx): Auth) -> impl IntoResponse {
//!     // ctx is AuthContext
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthContext, AuthError};

/// Extractor for authenticated users.
///
/// Rejects with [`AuthError::MissingCredential`] when no context was
/// published, which only happens if a handler is mounted outside the
/// middleware or on a public route.
pub struct Auth(pub AuthContext);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::MissingCredential)
    }
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthContext);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(ctx) = Auth::from_request_parts(parts, state).await?;

        if !ctx.is_admin() {
            return Err(AuthError::InsufficientRole);
        }

        Ok(AdminOnly(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::role_set;
    use crate::auth::Role;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn context(roles: &[Role]) -> AuthContext {
        AuthContext {
            username: "alice".to_string(),
            roles: role_set(roles.iter().copied()),
        }
    }

    #[tokio::test]
    async fn auth_extractor_requires_context() {
        let mut parts = parts();
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingCredential)));
    }

    #[tokio::test]
    async fn auth_extractor_reads_extensions() {
        let mut parts = parts();
        parts.extensions.insert(context(&[Role::User]));

        let Auth(ctx) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.username, "alice");
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let mut parts = parts();
        parts.extensions.insert(context(&[Role::User]));

        let result = AdminOnly::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::InsufficientRole)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let mut parts = parts();
        parts.extensions.insert(context(&[Role::User, Role::Admin]));

        assert!(AdminOnly::from_request_parts(&mut parts, &()).await.is_ok());
    }
}
