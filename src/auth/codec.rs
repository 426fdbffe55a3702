// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token issuance and decoding.
//!
//! Tokens are standard compact JWTs (`header.payload.signature`) signed with
//! HMAC-SHA256 under a single process-wide key.
//!
//! ## Decode order
//!
//! 1. Structure: exactly three non-empty segments, else `MalformedToken`
//! 2. Signature over `header.payload`, verified in constant time before any
//!    segment is parsed, else `BadSignature`
//! 3. Header and claims parsed, else `MalformedToken`
//!
//! Expiry is deliberately not checked here; callers use [`TokenCodec::is_expired`]
//! so they can report `Expired` separately from `BadSignature`.

use std::collections::BTreeSet;
use std::time::Duration;

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sha2::Sha256;

use super::claims::Claims;
use super::error::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Minimum signing key length in bytes (256 bits for HS256).
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("signing key must be at least {min} bytes, got {len}")]
    WeakKey { len: usize, min: usize },

    #[error("token lifetime must be between 1 second and {max} seconds")]
    InvalidTtl { max: i64 },

    #[error("failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies signed tokens. Stateless apart from the key.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    mac: HmacSha256,
    ttl_secs: i64,
}

impl TokenCodec {
    /// Create a codec. A short key is a startup error, never a per-request one.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, CodecError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(CodecError::WeakKey {
                len: secret.len(),
                min: MIN_SECRET_LEN,
            });
        }

        let max = i64::from(u32::MAX);
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        if ttl_secs == 0 || ttl_secs > max {
            return Err(CodecError::InvalidTtl { max });
        }

        let mac = HmacSha256::new_from_slice(secret).map_err(|_| CodecError::WeakKey {
            len: secret.len(),
            min: MIN_SECRET_LEN,
        })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            mac,
            ttl_secs,
        })
    }

    /// Build and sign claims `{sub, roles, iat: now, exp: now + ttl}`.
    pub fn issue(
        &self,
        username: &str,
        roles: &BTreeSet<String>,
        now: i64,
    ) -> Result<String, CodecError> {
        let claims = Claims {
            sub: username.to_string(),
            roles: roles.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Verify the signature, then parse the claims. Does not check expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::MalformedToken);
        };
        if header.is_empty() || payload.is_empty() || signature.is_empty() {
            return Err(AuthError::MalformedToken);
        }

        let signature =
            Base64UrlUnpadded::decode_vec(signature).map_err(|_| AuthError::BadSignature)?;
        let signing_input = &token[..header.len() + 1 + payload.len()];

        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        // Signature already checked above.
        let data = jsonwebtoken::dangerous::insecure_decode::<Claims>(token)
            .map_err(|_| AuthError::MalformedToken)?;
        if data.header.alg != Algorithm::HS256 {
            return Err(AuthError::MalformedToken);
        }

        Ok(data.claims)
    }

    /// `now >= exp`.
    pub fn is_expired(claims: &Claims, now: i64) -> bool {
        now >= claims.exp
    }

    #[cfg(test)]
    fn sign_segments(&self, header: &str, payload: &str) -> String {
        let signing_input = format!("{header}.{payload}");
        let mut mac = self.mac.clone();
        mac.update(signing_input.as_bytes());
        let tag = mac.finalize().into_bytes();
        format!("{signing_input}.{}", Base64UrlUnpadded::encode_string(&tag))
    }
}
