// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account flows that sit around the pipeline: registration, login, logout.
//!
//! Login and registration failures are reported to the client with
//! deliberately vague messages. The precise reason goes to the log.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::claims::role_set;
use super::codec::TokenCodec;
use super::directory::{CredentialRecord, DirectoryError, NewCredential, UserDirectory};
use super::error::AuthError;
use super::password::{CredentialVerifier, MAX_SECRET_LEN};
use super::revocation::RevocationStore;
use super::roles::Role;

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 64;
/// Password length bounds in bytes.
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = MAX_SECRET_LEN;

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    Invalid(&'static str),

    #[error("username already taken")]
    Duplicate,

    #[error("registration failed: {0}")]
    Internal(String),
}

/// Result of a logout call. Both variants are a success for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Token was valid and is now blacklisted until its natural expiry.
    Revoked { expires_at: i64 },
    /// Token could not be decoded, so it was never usable; nothing stored.
    NothingToRevoke,
}

pub struct AuthService {
    codec: Arc<TokenCodec>,
    verifier: Arc<CredentialVerifier>,
    revocations: Arc<RevocationStore>,
    directory: Arc<dyn UserDirectory>,
}

impl AuthService {
    pub fn new(
        codec: Arc<TokenCodec>,
        verifier: Arc<CredentialVerifier>,
        revocations: Arc<RevocationStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            codec,
            verifier,
            revocations,
            directory,
        }
    }

    /// Create a regular account (role `USER`).
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<CredentialRecord, RegistrationError> {
        self.register_with_roles(username, password, email, role_set([Role::User]))
            .await
    }

    pub async fn register_with_roles(
        &self,
        username: &str,
        password: &str,
        email: &str,
        roles: BTreeSet<String>,
    ) -> Result<CredentialRecord, RegistrationError> {
        validate_registration(username, password, email)?;

        let verifier = Arc::clone(&self.verifier);
        let secret = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || verifier.hash(&secret))
            .await
            .map_err(|e| RegistrationError::Internal(format!("hash task failed: {e}")))?
            .map_err(|e| RegistrationError::Internal(e.to_string()))?;

        let record = self
            .directory
            .create(NewCredential {
                username: username.to_string(),
                password_hash,
                email: email.to_string(),
                roles,
            })
            .map_err(|e| match e {
                DirectoryError::DuplicateUsername(_) => {
                    warn!(username = %username, "Registration rejected: username taken");
                    RegistrationError::Duplicate
                }
                DirectoryError::Unavailable(msg) => RegistrationError::Internal(msg),
            })?;

        info!(username = %record.username, user_id = %record.id, "User registered");
        Ok(record)
    }

    /// Verify credentials and issue a token carrying the account's roles.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller, including in timing.
    pub async fn login(&self, username: &str, password: &str, now: i64) -> Result<String, AuthError> {
        let record = self
            .directory
            .find_by_username(username)
            .map_err(|e| AuthError::Internal(format!("user lookup failed: {e}")))?;

        let verifier = Arc::clone(&self.verifier);
        let secret = password.to_string();
        let stored_hash = record.as_ref().map(|r| r.password_hash.clone());
        let matched = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => verifier.matches(&secret, &hash),
            None => verifier.matches_dummy(&secret),
        })
        .await
        .map_err(|e| AuthError::Internal(format!("password check task failed: {e}")))?;

        let Some(record) = record else {
            warn!(username = %username, reason = "unknown_user", "Login failed");
            return Err(AuthError::BadCredential);
        };
        if !matched {
            warn!(username = %username, reason = "wrong_password", "Login failed");
            return Err(AuthError::BadCredential);
        }

        let token = self
            .codec
            .issue(&record.username, &record.roles, now)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!(username = %record.username, "Login successful");
        Ok(token)
    }

    /// Blacklist `token` until its natural expiry. Safe to call repeatedly.
    pub fn logout(&self, token: &str) -> LogoutOutcome {
        match self.codec.decode(token) {
            Ok(claims) => {
                self.revocations.revoke(token, claims.exp);
                info!(username = %claims.sub, expires_at = claims.exp, "Token revoked");
                LogoutOutcome::Revoked {
                    expires_at: claims.exp,
                }
            }
            Err(e) => {
                debug!(reason = e.error_code(), "Logout with undecodable token");
                LogoutOutcome::NothingToRevoke
            }
        }
    }
}

fn validate_registration(
    username: &str,
    password: &str,
    email: &str,
) -> Result<(), RegistrationError> {
    if username.is_empty()
        || username.chars().count() > MAX_USERNAME_LEN
        || username.chars().any(char::is_whitespace)
    {
        return Err(RegistrationError::Invalid(
            "Username must be 1-64 characters without whitespace",
        ));
    }
    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(RegistrationError::Invalid(
            "Password must be between 8 and 72 bytes",
        ));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(RegistrationError::Invalid("Email address is invalid")),
    }
}
