// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User roles for authorization.
///
/// Tokens carry roles as plain strings (`"USER"`, `"ADMIN"`); this enum is the
/// typed view used by role checks. Unknown strings in a token are ignored by
/// role checks rather than rejected.
///
/// ## Role Hierarchy
///
/// - `Admin` - Everything a user can do, plus operational endpoints
/// - `User` - Regular account holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Operational access
    Admin,
    /// Regular account holder
    User,
}

impl Role {
    /// Wire representation stored in token claims.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            (Role::Admin, _) => true,
            (Role::User, Role::User) => true,
            _ => false,
        }
    }

    /// Parse role from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
