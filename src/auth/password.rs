// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and verification (bcrypt).
//!
//! bcrypt is CPU-bound. Async callers should run these methods on
//! the blocking pool (`tokio::task::spawn_blocking`).

/// bcrypt only reads this many bytes of the secret.
pub const MAX_SECRET_LEN: usize = 72;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("secret longer than 72 bytes")]
    TooLong,
}

/// Salted one-way password hashing.
pub struct CredentialVerifier {
    cost: u32,
    /// Hash of a throwaway secret, checked when the account does not exist so
    /// login latency does not reveal which usernames are registered.
    dummy_hash: String,
}

impl CredentialVerifier {
    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        let dummy_hash = bcrypt::hash("dummy-password-for-timing", cost)?;
        Ok(Self { cost, dummy_hash })
    }

    /// Hash a secret with a fresh salt. Secrets bcrypt would truncate are refused.
    pub fn hash(&self, secret: &str) -> Result<String, CredentialError> {
        if secret.len() > MAX_SECRET_LEN {
            return Err(CredentialError::TooLong);
        }
        Ok(bcrypt::hash(secret, self.cost)?)
    }

    /// True iff `secret` verifies against `hash`. Malformed hashes and secrets
    /// past [`MAX_SECRET_LEN`] yield false.
    pub fn matches(&self, secret: &str, hash: &str) -> bool {
        // Verify first so an over-long secret costs the same as any other miss.
        let verified = bcrypt::verify(secret, hash).unwrap_or(false);
        verified && secret.len() <= MAX_SECRET_LEN
    }

    /// Spend the same work as [`matches`](Self::matches) and always return false.
    pub fn matches_dummy(&self, secret: &str) -> bool {
        let _ = bcrypt::verify(secret, &self.dummy_hash);
        false
    }
}
