// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login and token endpoints.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    audit_log,
    auth::{
        hash_password, normalize_email, verify_login, Auth, AuthError, Role, TokenType,
        MIN_PASSWORD_LEN,
    },
    error::ApiError,
    models::{
        AccountResponse, LoginRequest, LoginResponse, RefreshRequest, RefreshResponse,
        RegisterRequest, ValidateResponse,
    },
    state::AppState,
    storage::{AuditEvent, AuditEventType, StoreError, StoredAccount},
};

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Create an account.
///
/// Emails listed in `ADMIN_EMAILS` register with the admin role.
#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already registered"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let email = normalize_email(&request.email);
    if !looks_like_email(&email) {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;
    let role = if state.is_admin_email(&email) {
        Role::Admin
    } else {
        Role::Client
    };
    let account = StoredAccount::new(
        email.as_str(),
        request.first_name.trim(),
        request.last_name.trim(),
        password_hash,
        role,
    );

    match state.store.create_account(&account) {
        Ok(()) => {}
        Err(StoreError::AlreadyExists(_)) => {
            return Err(ApiError::conflict("An account with this email already exists"))
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(account = %email, %role, "Account registered");
    audit_log!(
        state.store,
        AuditEvent::new(AuditEventType::AccountRegistered)
            .with_account(email.as_str())
            .with_resource("account", email.as_str())
    );

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Exchange email and password for an access/refresh token pair.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let email = normalize_email(&request.email);

    let account = state.store.get_account(&email)?;

    // PBKDF2 runs off the async workers, and for unknown emails too.
    let password = request.password;
    let (account, verified) = tokio::task::spawn_blocking(move || {
        let stored = account.as_ref().map(|a| a.password_hash.as_str());
        let verified = verify_login(&password, stored);
        (account, verified)
    })
    .await
    .map_err(|e| AuthError::InternalError(e.to_string()))?;
    let account = account.filter(|_| verified);

    let Some(account) = account else {
        audit_log!(
            state.store,
            AuditEvent::new(AuditEventType::LoginFailed)
                .with_account(email.as_str())
                .failed("invalid credentials")
        );
        return Err(AuthError::InvalidCredentials);
    };

    let tokens = state.tokens.issue_pair(&account.email, account.role)?;
    audit_log!(
        state.store,
        AuditEvent::new(AuditEventType::LoginSucceeded).with_account(account.email.as_str())
    );

    Ok(Json(LoginResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        first_name: account.first_name,
        last_name: account.last_name,
        message: "Login successful".to_string(),
    }))
}

/// Mint a new access token from a refresh token.
///
/// The role is re-read from the account, so role changes apply on refresh.
#[utoipa::path(
    post,
    path = "/v1/auth/token/refresh",
    tag = "Auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Invalid or expired refresh token"),
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AuthError> {
    let claims = state.tokens.verify(&request.refresh, TokenType::Refresh)?;
    let account = state
        .store
        .get_account(&claims.sub)?
        .ok_or(AuthError::UnknownAccount)?;

    let access = state
        .tokens
        .issue(&account.email, account.role, TokenType::Access)?;
    Ok(Json(RefreshResponse { access }))
}

/// Check that the bearer access token is valid.
#[utoipa::path(
    get,
    path = "/v1/auth/token/validate",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token is valid", body = ValidateResponse),
        (status = 401, description = "Invalid or missing token"),
    )
)]
pub async fn validate_token(Auth(user): Auth) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        valid: true,
        email: user.email,
    })
}
