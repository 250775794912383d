// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    credentials::{
        CarInsuranceDetails, CarRegistrationDetails, CredentialDetails, CredentialKind,
        CredentialRecord, DriversLicenseDetails, HealthCardDetails, TransitCardDetails,
    },
    models::{
        AccountResponse, AuditLogResponse, DecryptRequest, FindRequest, LinkRequest, LinkResponse,
        LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
        UserInfoResponse, ValidateResponse,
    },
    state::AppState,
    storage::{AuditEvent, AuditEventType, LinkedCredentials},
};

pub mod admin;
pub mod auth;
pub mod credentials;
pub mod health;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/token/refresh", post(auth::refresh_token))
        .route("/auth/token/validate", get(auth::validate_token))
        .route("/users/me", get(users::get_current_user))
        .route("/credentials/{kind}/link", post(credentials::link_credential))
        .route("/credentials/{kind}/find", post(credentials::find_credential))
        .route(
            "/credentials/{kind}/decrypt",
            post(credentials::decrypt_credential),
        )
        .route("/admin/credentials", post(admin::provision_credential))
        .route("/admin/audit", get(admin::list_audit_events));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// Registers the `bearer` scheme referenced by protected endpoints.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        auth::register,
        auth::login,
        auth::refresh_token,
        auth::validate_token,
        users::get_current_user,
        credentials::link_credential,
        credentials::find_credential,
        credentials::decrypt_credential,
        admin::provision_credential,
        admin::list_audit_events
    ),
    components(
        schemas(
            Role,
            CredentialKind,
            CredentialRecord,
            CredentialDetails,
            DriversLicenseDetails,
            HealthCardDetails,
            TransitCardDetails,
            CarRegistrationDetails,
            CarInsuranceDetails,
            LinkedCredentials,
            AccountResponse,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            RefreshResponse,
            ValidateResponse,
            UserInfoResponse,
            LinkRequest,
            LinkResponse,
            FindRequest,
            DecryptRequest,
            AuditEvent,
            AuditEventType,
            AuditLogResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Registration, login and tokens"),
        (name = "Users", description = "Current account"),
        (name = "Credentials", description = "Credential linking and lookup"),
        (name = "Admin", description = "Provisioning and audit trail")
    )
)]
struct ApiDoc;
