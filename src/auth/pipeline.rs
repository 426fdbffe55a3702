// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Pipeline
//!
//! Ordered checks applied to every inbound request. Each stage either lets the
//! request continue or rejects it; the first rejection wins.
//!
//! | # | Stage | Rejection |
//! |---|-------|-----------|
//! | 1 | Bypass (public route) | none |
//! | 2 | Header extraction | `MissingCredential` |
//! | 3 | Blacklist check | `Revoked` |
//! | 4 | Decode (signature first) | `MalformedToken` / `BadSignature` |
//! | 5 | Expiry check | `Expired` |
//! | 6 | Identity resolution | `UnknownSubject` |
//! | 7 | Context publication | none |
//!
//! The pipeline knows nothing about axum; [`super::middleware`] adapts it.

use std::sync::Arc;

use tracing::{debug, warn};

use super::claims::{AuthContext, Claims};
use super::codec::TokenCodec;
use super::directory::UserDirectory;
use super::error::AuthError;
use super::revocation::RevocationStore;

const BEARER_PREFIX: &str = "Bearer ";

/// Routes that skip authentication.
#[derive(Debug, Clone)]
pub struct PublicRoutes {
    /// Matched exactly
    exact: Vec<String>,
    /// Matched as the path itself or any sub-path
    prefixes: Vec<String>,
}

impl PublicRoutes {
    pub fn new<E, P>(exact: E, prefixes: P) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            exact: exact.into_iter().map(Into::into).collect(),
            prefixes: prefixes
                .into_iter()
                .map(|p| Into::<String>::into(p).trim_end_matches('/').to_string())
                .collect(),
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        if self.exact.iter().any(|p| p == path) {
            return true;
        }
        self.prefixes.iter().any(|prefix| {
            path.strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        })
    }
}

impl Default for PublicRoutes {
    fn default() -> Self {
        Self::new(
            ["/auth/login", "/auth/register", "/auth/logout"],
            ["/health", "/docs", "/api-doc"],
        )
    }
}

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Public route; no identity attached.
    Bypass,
    /// Protected route; identity attached for downstream handlers.
    Authenticated(AuthContext),
}

/// Extract the token from an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .ok_or(AuthError::MissingCredential)?
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MissingCredential)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

pub struct AuthPipeline {
    codec: Arc<TokenCodec>,
    revocations: Arc<RevocationStore>,
    directory: Arc<dyn UserDirectory>,
    public_routes: PublicRoutes,
}

impl AuthPipeline {
    pub fn new(
        codec: Arc<TokenCodec>,
        revocations: Arc<RevocationStore>,
        directory: Arc<dyn UserDirectory>,
        public_routes: PublicRoutes,
    ) -> Self {
        Self {
            codec,
            revocations,
            directory,
            public_routes,
        }
    }

    /// Run every stage in order for one request.
    pub fn evaluate(
        &self,
        path: &str,
        authorization: Option<&str>,
        now: i64,
    ) -> Result<Verdict, AuthError> {
        if self.public_routes.is_public(path) {
            return Ok(Verdict::Bypass);
        }

        let token = bearer_token(authorization)?;
        self.check_blacklist(token, now)?;
        let claims = self.codec.decode(token)?;
        check_expiry(&claims, now)?;
        self.resolve_identity(&claims)?;

        Ok(Verdict::Authenticated(AuthContext::from_claims(claims)))
    }

    fn check_blacklist(&self, token: &str, now: i64) -> Result<(), AuthError> {
        if self.revocations.is_revoked(token, now) {
            debug!("Rejected revoked token");
            return Err(AuthError::Revoked);
        }
        Ok(())
    }

    fn resolve_identity(&self, claims: &Claims) -> Result<(), AuthError> {
        match self.directory.find_by_username(&claims.sub) {
            Ok(Some(_)) => Ok(()),
            Ok(None) => {
                warn!(username = %claims.sub, "Token subject not found in directory");
                Err(AuthError::UnknownSubject)
            }
            Err(e) => Err(AuthError::Internal(format!("user lookup failed: {e}"))),
        }
    }
}

fn check_expiry(claims: &Claims, now: i64) -> Result<(), AuthError> {
    if TokenCodec::is_expired(claims, now) {
        return Err(AuthError::Expired);
    }
    Ok(())
}
