// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Self-issued HS256 bearer tokens for the finance API.
//!
//! ## Auth Flow
//!
//! 1. Client registers, then calls `POST /auth/login` with username and password
//! 2. Server verifies the bcrypt hash and issues a signed token carrying
//!    `sub`, `roles`, `iat` and `exp`
//! 3. Client sends `Authorization: Bearer <token>` on every protected call
//! 4. [`middleware::auth_middleware`] runs the [`AuthPipeline`] and publishes
//!    an [`AuthContext`] for handlers
//! 5. `POST /auth/logout` blacklists the token until it would have expired
//!
//! ## Security
//!
//! - Every route outside [`PublicRoutes`] requires a token
//! - The signature is checked before any claim is trusted
//! - Rejections share one JSON shape and never echo the token

pub mod claims;
pub mod codec;
pub mod directory;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod pipeline;
pub mod revocation;
pub mod roles;
pub mod service;

pub use claims::{AuthContext, Claims};
pub use codec::TokenCodec;
pub use directory::{CredentialRecord, UserDirectory};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use password::CredentialVerifier;
pub use pipeline::{AuthPipeline, PublicRoutes, Verdict};
pub use revocation::{RevocationStore, RevocationSweeper};
pub use roles::Role;
pub use service::{AuthService, LogoutOutcome, RegistrationError};
