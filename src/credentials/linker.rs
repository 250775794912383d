// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! One-time linking of a credential record to an account.

use super::error::CredentialError;
use super::kind::CredentialKind;
use super::record::CredentialRecord;
use crate::audit_log;
use crate::auth::normalize_email;
use crate::storage::{AuditEvent, AuditEventType, ClaimOutcome, CredentialStore};

/// Claim the record `kind`/`external_number` for the account `email`.
///
/// Succeeds at most once per record, for any account. A second call, even by
/// the current owner, fails with [`CredentialError::AlreadyLinked`]. The email
/// is normalized before use.
pub fn link(
    store: &CredentialStore,
    email: &str,
    kind: CredentialKind,
    external_number: &str,
) -> Result<CredentialRecord, CredentialError> {
    let number = external_number.trim();
    if number.is_empty() {
        return Err(CredentialError::MissingParameter(
            kind.number_label().to_string(),
        ));
    }

    let email = normalize_email(email);
    let email = email.as_str();

    let result = match store.claim_credential(kind, number, email)? {
        ClaimOutcome::Claimed(record) => Ok(record),
        ClaimOutcome::NotLinkable => Err(CredentialError::NotLinkable(kind)),
        ClaimOutcome::RecordNotFound => Err(CredentialError::NotFound(kind)),
        ClaimOutcome::AccountNotFound => Err(CredentialError::AccountNotFound),
        ClaimOutcome::AlreadyOwned => Err(CredentialError::AlreadyLinked(kind)),
        ClaimOutcome::AccountSlotTaken { existing } => {
            tracing::debug!(%kind, existing = %existing, "Account slot already filled");
            Err(CredentialError::AccountSlotTaken(kind))
        }
    };

    let event = AuditEvent::new(AuditEventType::CredentialLinked)
        .with_account(email)
        .with_resource(kind.as_str(), number);
    match &result {
        Ok(_) => {
            tracing::info!(%kind, number = %number, account = %email, "Credential linked");
            audit_log!(store, event);
        }
        Err(e) => {
            let mut event = event.failed(e.to_string());
            event.event_type = AuditEventType::CredentialLinkRejected;
            audit_log!(store, event);
        }
    }

    result
}
