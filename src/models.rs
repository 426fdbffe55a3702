// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. All types derive `ToSchema`
//! for the OpenAPI document served at `/api-doc/openapi.json`.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CredentialRecord;

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer token for the `Authorization` header
    pub token: String,
}

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<CredentialRecord> for UserProfile {
    fn from(record: CredentialRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Revocation store occupancy, for operators.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevocationStats {
    /// Entries currently held, including expired ones awaiting the sweeper
    pub active_entries: usize,
}
