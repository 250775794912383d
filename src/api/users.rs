// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};

use crate::auth::Auth;
use crate::credentials::{CredentialKind, CredentialRecord};
use crate::error::ApiError;
use crate::models::UserInfoResponse;
use crate::state::AppState;
use crate::storage::StoredAccount;

fn linked_record(
    state: &AppState,
    account: &StoredAccount,
    kind: CredentialKind,
) -> Result<Option<CredentialRecord>, ApiError> {
    match account.linked.get(kind) {
        Some(number) => Ok(state.store.get_credential(kind, number)?),
        None => Ok(None),
    }
}

/// Get the current account with its linked records.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserInfoResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Account no longer exists"),
    )
)]
pub async fn get_current_user(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let account = state
        .store
        .get_account(&user.email)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let drivers_license = linked_record(&state, &account, CredentialKind::DriversLicense)?;
    let health_card = linked_record(&state, &account, CredentialKind::HealthCard)?;
    let transit_card = linked_record(&state, &account, CredentialKind::TransitCard)?;

    Ok(Json(UserInfoResponse {
        user: account.into(),
        drivers_license,
        health_card,
        transit_card,
    }))
}
