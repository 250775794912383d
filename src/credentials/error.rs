// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::http::StatusCode;

use super::kind::CredentialKind;
use crate::crypto::CipherError;
use crate::error::ApiError;
use crate::storage::StoreError;

/// Client-facing message for every decryption failure stage.
pub const DECRYPTION_FAILED_MESSAGE: &str = "Unable to decrypt credential";

/// Outcomes of the link, lookup and decrypt-and-lookup operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Any decrypt stage. Displays the same text for every stage.
    #[error("Unable to decrypt credential")]
    Decryption(CipherError),

    #[error("{0} is required")]
    MissingParameter(String),

    #[error("{} cannot be linked to an account", .0.display_name())]
    NotLinkable(CredentialKind),

    #[error("{} not found", .0.display_name())]
    NotFound(CredentialKind),

    #[error("User not found")]
    AccountNotFound,

    #[error("{} is already linked to an account", .0.display_name())]
    AlreadyLinked(CredentialKind),

    #[error("A {} is already linked to this account", .0.display_name().to_lowercase())]
    AccountSlotTaken(CredentialKind),

    #[error("storage failure")]
    Storage(#[from] StoreError),
}

impl From<CipherError> for CredentialError {
    fn from(e: CipherError) -> Self {
        tracing::debug!(stage = %e, "Credential ciphertext rejected");
        CredentialError::Decryption(e)
    }
}

impl CredentialError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CredentialError::Decryption(_)
            | CredentialError::MissingParameter(_)
            | CredentialError::NotLinkable(_) => StatusCode::BAD_REQUEST,
            CredentialError::NotFound(_) | CredentialError::AccountNotFound => {
                StatusCode::NOT_FOUND
            }
            CredentialError::AlreadyLinked(_) | CredentialError::AccountSlotTaken(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            CredentialError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::Storage(inner) => ApiError::internal(inner),
            other => ApiError::new(other.status_code(), other.to_string()),
        }
    }
}
