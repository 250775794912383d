// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential link, lookup and decrypt-then-lookup endpoints.
//!
//! `{kind}` is one of `drivers-license`, `health-card`, `transit-card`,
//! `car-registration` or `car-insurance`.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    auth::Auth,
    credentials::{self, CredentialKind, CredentialRecord},
    error::ApiError,
    models::{DecryptRequest, FindRequest, LinkRequest, LinkResponse},
    state::AppState,
};

fn parse_kind(raw: &str) -> Result<CredentialKind, ApiError> {
    raw.parse().map_err(ApiError::not_found)
}

/// Link a credential record to the calling account.
///
/// A record can be linked once, ever. Linking an already linked record fails
/// even when the caller is the current owner.
#[utoipa::path(
    post,
    path = "/v1/credentials/{kind}/link",
    tag = "Credentials",
    security(("bearer" = [])),
    params(("kind" = String, Path, description = "Credential kind slug")),
    request_body = LinkRequest,
    responses(
        (status = 200, description = "Record linked", body = LinkResponse),
        (status = 400, description = "Missing number or kind cannot be linked"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Record or account not found"),
        (status = 422, description = "Record already linked, or account already holds one of this kind"),
    )
)]
pub async fn link_credential(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(kind): Path<String>,
    Json(request): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let record = credentials::link(&state.store, &user.email, kind, &request.external_number)?;

    Ok(Json(LinkResponse {
        message: format!("{} linked successfully", kind.display_name()),
        external_number: record.number,
    }))
}

/// Find a record by number or by owner email.
#[utoipa::path(
    post,
    path = "/v1/credentials/{kind}/find",
    tag = "Credentials",
    security(("bearer" = [])),
    params(("kind" = String, Path, description = "Credential kind slug")),
    request_body = FindRequest,
    responses(
        (status = 200, description = "Record found", body = CredentialRecord),
        (status = 400, description = "Neither number nor email supplied"),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "Record or account not found"),
    )
)]
pub async fn find_credential(
    State(state): State<AppState>,
    Auth(_user): Auth,
    Path(kind): Path<String>,
    Json(request): Json<FindRequest>,
) -> Result<Json<CredentialRecord>, ApiError> {
    let kind = parse_kind(&kind)?;
    let record = credentials::find(
        &state.store,
        kind,
        request.number.as_deref(),
        request.email.as_deref(),
    )?;
    Ok(Json(record))
}

/// Decrypt a client ciphertext and return the record it names.
#[utoipa::path(
    post,
    path = "/v1/credentials/{kind}/decrypt",
    tag = "Credentials",
    params(("kind" = String, Path, description = "Credential kind slug")),
    request_body = DecryptRequest,
    responses(
        (status = 200, description = "Record found", body = CredentialRecord),
        (status = 400, description = "Ciphertext could not be decrypted"),
        (status = 404, description = "Record not found"),
    )
)]
pub async fn decrypt_credential(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<DecryptRequest>,
) -> Result<Json<CredentialRecord>, ApiError> {
    let kind = parse_kind(&kind)?;
    let record = credentials::decrypt_and_find(&state.store, &state.cipher, kind, &request.ciphertext)?;
    Ok(Json(record))
}
