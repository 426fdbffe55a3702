// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the per-request authenticated context.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims sealed inside every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Role snapshot taken at login
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated identity for one request.
///
/// Built from token claims alone. Roles reflect the snapshot taken when the
/// token was issued; a role change in the directory only shows up after the
/// holder logs in again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthContext {
    pub username: String,
    pub roles: BTreeSet<String>,
}

impl AuthContext {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            roles: claims.roles,
        }
    }

    /// Check if any role in the token grants the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.roles
            .iter()
            .filter_map(|r| Role::from_str(r))
            .any(|r| r.has_privilege(required))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Role set as stored in claims.
pub fn role_set<I>(roles: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = Role>,
{
    roles.into_iter().map(|r| r.as_str().to_string()).collect()
}
