// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory user directory.
//!
//! Accounts live for the lifetime of the process. Swap in a persistent
//! [`UserDirectory`] implementation for anything beyond a single instance.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::directory::{CredentialRecord, DirectoryError, NewCredential, UserDirectory};

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove an account. Outstanding tokens for it stop resolving.
    pub fn remove(&self, username: &str) -> Option<CredentialRecord> {
        let mut users = match self.users.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        users.remove(username)
    }

    /// Replace the stored role set. Tokens already issued keep their snapshot.
    pub fn set_roles(&self, username: &str, roles: BTreeSet<String>) -> bool {
        let mut users = match self.users.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match users.get_mut(username) {
            Some(record) => {
                record.roles = roles;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        match self.users.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, DirectoryError> {
        let users = match self.users.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(users.get(username).cloned())
    }

    fn create(&self, credential: NewCredential) -> Result<CredentialRecord, DirectoryError> {
        let mut users = match self.users.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if users.contains_key(&credential.username) {
            return Err(DirectoryError::DuplicateUsername(credential.username));
        }

        let record = CredentialRecord {
            id: Uuid::new_v4(),
            username: credential.username,
            password_hash: credential.password_hash,
            email: credential.email,
            roles: credential.roles,
            created_at: Utc::now(),
        };
        users.insert(record.username.clone(), record.clone());
        Ok(record)
    }
}
