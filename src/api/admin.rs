// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints.
//!
//! These endpoints require the Admin role and provide:
//! - Credential record provisioning
//! - Audit log queries

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    audit_log,
    auth::AdminOnly,
    credentials::CredentialRecord,
    error::ApiError,
    models::{AuditLogResponse, AuditQueryParams},
    state::AppState,
    storage::{AuditEvent, AuditEventType, StoreError},
};

const DEFAULT_AUDIT_LIMIT: usize = 100;
const MAX_AUDIT_LIMIT: usize = 1_000;

/// Provision a new, unowned credential record.
#[utoipa::path(
    post,
    path = "/v1/admin/credentials",
    tag = "Admin",
    security(("bearer" = [])),
    request_body = CredentialRecord,
    responses(
        (status = 201, description = "Record provisioned", body = CredentialRecord),
        (status = 400, description = "Missing number or record already has an owner"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "A record with this number already exists"),
    )
)]
pub async fn provision_credential(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Json(mut record): Json<CredentialRecord>,
) -> Result<(StatusCode, Json<CredentialRecord>), ApiError> {
    record.number = record.number.trim().to_string();
    if record.number.is_empty() {
        return Err(ApiError::bad_request(format!(
            "{} is required",
            record.kind().number_label()
        )));
    }

    match state.store.insert_credential(&record) {
        Ok(()) => {}
        Err(StoreError::AlreadyExists(_)) => {
            return Err(ApiError::conflict(format!(
                "{} {} already exists",
                record.kind().display_name(),
                record.number
            )))
        }
        Err(StoreError::Integrity(_)) => {
            return Err(ApiError::bad_request(
                "Records must be provisioned without an owner",
            ))
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(kind = %record.kind(), number = %record.number, admin = %admin.email, "Credential provisioned");
    audit_log!(
        state.store,
        AuditEvent::new(AuditEventType::CredentialProvisioned)
            .with_account(admin.email.as_str())
            .with_resource(record.kind().as_str(), record.number.as_str())
            .with_details(serde_json::json!({ "source": "admin" }))
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// Most recent audit events, newest first.
#[utoipa::path(
    get,
    path = "/v1/admin/audit",
    tag = "Admin",
    security(("bearer" = [])),
    params(AuditQueryParams),
    responses(
        (status = 200, description = "Audit events", body = AuditLogResponse),
        (status = 403, description = "Admin role required"),
    )
)]
pub async fn list_audit_events(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_AUDIT_LIMIT)
        .min(MAX_AUDIT_LIMIT);
    let events = state.store.recent_audit(limit)?;
    let total = events.len();
    Ok(Json(AuditLogResponse { events, total }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};
    use crate::credentials::{record::fixtures, CredentialKind};

    fn admin() -> AdminOnly {
        AdminOnly(AuthenticatedUser {
            email: "admin@x.com".to_string(),
            role: Role::Admin,
            expires_at: 0,
        })
    }

    #[tokio::test]
    async fn provision_creates_unowned_record() {
        let (state, _dir) = AppState::for_tests();

        let (status, Json(record)) = provision_credential(
            State(state.clone()),
            admin(),
            Json(fixtures::transit_card(" TC-42 ")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record.number, "TC-42");

        let stored = state
            .store
            .get_credential(CredentialKind::TransitCard, "TC-42")
            .unwrap()
            .unwrap();
        assert!(stored.owner.is_none());
    }

    #[tokio::test]
    async fn provision_rejects_duplicates_owned_and_blank() {
        let (state, _dir) = AppState::for_tests();
        provision_credential(State(state.clone()), admin(), Json(fixtures::health_card("HC-1")))
            .await
            .unwrap();

        let dup = provision_credential(State(state.clone()), admin(), Json(fixtures::health_card("HC-1")))
            .await
            .unwrap_err();
        assert_eq!(dup.status, StatusCode::CONFLICT);

        let mut owned = fixtures::health_card("HC-2");
        owned.owner = Some("a@x.com".to_string());
        let owned = provision_credential(State(state.clone()), admin(), Json(owned))
            .await
            .unwrap_err();
        assert_eq!(owned.status, StatusCode::BAD_REQUEST);

        let blank = provision_credential(State(state.clone()), admin(), Json(fixtures::health_card("  ")))
            .await
            .unwrap_err();
        assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn audit_lists_provisioning() {
        let (state, _dir) = AppState::for_tests();
        provision_credential(State(state.clone()), admin(), Json(fixtures::car_insurance("POL-9")))
            .await
            .unwrap();

        let Json(log) = list_audit_events(
            State(state.clone()),
            admin(),
            Query(AuditQueryParams { limit: Some(5) }),
        )
        .await
        .unwrap();
        assert_eq!(log.total, 1);
        assert_eq!(log.events[0].event_type, AuditEventType::CredentialProvisioned);
        assert_eq!(log.events[0].resource_id.as_deref(), Some("POL-9"));
        assert_eq!(log.events[0].account.as_deref(), Some("admin@x.com"));
    }
}
