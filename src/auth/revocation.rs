// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Revocation
//!
//! Process-wide registry of tokens revoked before their natural expiry
//! (logout). This is the only shared mutable state in the auth core.
//!
//! ## Identity
//!
//! Entries are keyed by the SHA-256 digest of the raw token string, so the
//! store holds 32 bytes per token regardless of token length.
//!
//! ## Concurrency
//!
//! Backed by a sharded [`DashMap`]: a `revoke` is visible to every lookup that
//! starts after it returns, and purging one shard never blocks lookups that
//! hash to another.
//!
//! ## Memory bound
//!
//! An entry is useless once its token has expired (the expiry check rejects
//! the token anyway). Expired entries are removed when a lookup finds them
//! and by [`RevocationSweeper`] on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::clock::Clock;

/// Content-derived identifier of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId([u8; 32]);

impl TokenId {
    pub fn of(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        let mut id = [0u8; 32];
        id.copy_from_slice(&digest);
        Self(id)
    }
}

/// Revoked tokens with their natural expiry (Unix seconds).
#[derive(Debug, Default)]
pub struct RevocationStore {
    entries: DashMap<TokenId, i64>,
}

impl RevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `token` revoked until `expires_at`. Revoking again just rewrites
    /// the same expiry.
    pub fn revoke(&self, token: &str, expires_at: i64) {
        self.entries.insert(TokenId::of(token), expires_at);
    }

    /// True iff `token` was revoked and its entry has not yet expired.
    pub fn is_revoked(&self, token: &str, now: i64) -> bool {
        let id = TokenId::of(token);
        // Copy the expiry out so the shard guard is released before any removal.
        let expires_at = self.entries.get(&id).map(|entry| *entry.value());

        match expires_at {
            Some(expires_at) if now < expires_at => true,
            Some(_) => {
                self.entries.remove_if(&id, |_, expires_at| now >= *expires_at);
                false
            }
            None => false,
        }
    }

    /// Drop every entry with `now >= expires_at`. Returns how many were removed.
    pub fn purge_expired(&self, now: i64) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, expires_at| {
            let keep = now < *expires_at;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Background task that purges expired revocation entries.
pub struct RevocationSweeper {
    store: Arc<RevocationStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl RevocationSweeper {
    pub fn new(store: Arc<RevocationStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            store,
            clock,
            interval,
        }
    }

    /// Run until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Revocation sweeper starting"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Revocation sweeper shutting down");
                    return;
                }
            }

            self.sweep();
        }
    }

    fn sweep(&self) -> usize {
        let removed = self.store.purge_expired(self.clock.now());
        if removed > 0 {
            debug!(
                removed,
                remaining = self.store.len(),
                "Purged expired revocation entries"
            );
        }
        removed
    }
}
