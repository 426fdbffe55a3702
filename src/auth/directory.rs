// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User directory seam.
//!
//! The authentication pipeline only ever calls
//! [`find_by_username`](UserDirectory::find_by_username). Registration goes
//! through [`create`](UserDirectory::create). Persistence is up to the
//! implementation; [`crate::store::InMemoryUserDirectory`] is the bundled one.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Stored account. The password hash never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub email: String,
    /// Roles stamped into tokens issued at login
    pub roles: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating an account. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub roles: BTreeSet<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

pub trait UserDirectory: Send + Sync {
    /// Exact-match lookup.
    fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, DirectoryError>;

    /// Create an account. Usernames are unique.
    fn create(&self, credential: NewCredential) -> Result<CredentialRecord, DirectoryError>;
}
