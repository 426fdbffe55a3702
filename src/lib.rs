// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Finance Auth Server - token authentication for the finance API
//!
//! Issues signed bearer tokens at login, checks every inbound request against
//! them, and supports logout by blacklisting tokens until they expire.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token codec, password verification, revocation and the request pipeline
//! - `clock` - Injectable time source
//! - `config` - Environment-driven settings
//! - `store` - In-memory user directory

pub mod api;
pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod store;
