// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only operational endpoints.

use axum::{extract::State, Json};

use crate::{auth::AdminOnly, models::RevocationStats, state::AppState};

/// Report how many revocation entries are held.
#[utoipa::path(
    get,
    path = "/admin/revocations",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Revocation store occupancy", body = RevocationStats),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin role required"),
    )
)]
pub async fn revocation_stats(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<RevocationStats> {
    Json(RevocationStats {
        active_entries: state.revocations.len(),
    })
}
