// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive serde and
//! `ToSchema` for JSON handling and OpenAPI documentation. Credential records
//! themselves are returned as [`CredentialRecord`].
//!
//! ## Legacy Field Names
//!
//! Deployed mobile clients send camelCase names (`firstName`,
//! `driversLicenseNumber`, `healthCardNumber`, `transitNumber`). Those are
//! accepted as aliases on the request types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Role;
use crate::credentials::CredentialRecord;
use crate::storage::{AuditEvent, LinkedCredentials, StoredAccount};

// =============================================================================
// Account Models
// =============================================================================

/// Request body for `POST /v1/auth/register`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
}

/// Public view of an account. Never includes the password hash.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct AccountResponse {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    /// Numbers of the linked records, by kind.
    pub linked: LinkedCredentials,
}

impl From<StoredAccount> for AccountResponse {
    fn from(account: StoredAccount) -> Self {
        Self {
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            role: account.role,
            created_at: account.created_at,
            linked: account.linked,
        }
    }
}

// =============================================================================
// Token Models
// =============================================================================

/// Request body for `POST /v1/auth/login`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login: a token pair plus the names shown by the client.
///
/// The names keep the camelCase keys that deployed clients read.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub message: String,
}

/// Request body for `POST /v1/auth/token/refresh`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

/// Response for `GET /v1/auth/token/validate`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ValidateResponse {
    pub valid: bool,
    pub email: String,
}

// =============================================================================
// User Models
// =============================================================================

/// Current account together with the full linked records.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserInfoResponse {
    pub user: AccountResponse,
    pub drivers_license: Option<CredentialRecord>,
    pub health_card: Option<CredentialRecord>,
    pub transit_card: Option<CredentialRecord>,
}

// =============================================================================
// Credential Models
// =============================================================================

/// Request body for `POST /v1/credentials/{kind}/link`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LinkRequest {
    /// External document number to claim.
    #[serde(
        default,
        alias = "number",
        alias = "driversLicenseNumber",
        alias = "healthCardNumber",
        alias = "transitNumber"
    )]
    pub external_number: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LinkResponse {
    pub message: String,
    pub external_number: String,
}

/// Request body for `POST /v1/credentials/{kind}/find`.
///
/// `number` wins when both fields are present.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct FindRequest {
    #[serde(
        default,
        alias = "external_number",
        alias = "driversLicenseNumber",
        alias = "healthCardNumber",
        alias = "transitNumber"
    )]
    pub number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Request body for `POST /v1/credentials/{kind}/decrypt`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DecryptRequest {
    /// Base64 ciphertext of the external number.
    #[serde(default)]
    pub ciphertext: String,
}

// =============================================================================
// Admin Models
// =============================================================================

/// Query parameters for `GET /v1/admin/audit`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQueryParams {
    /// Maximum number of events (default 100, capped at 1000).
    pub limit: Option<usize>,
}

/// Most recent audit events, newest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogResponse {
    pub events: Vec<AuditEvent>,
    pub total: usize,
}
