// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::credentials::CredentialKind;

/// Registered account, keyed by normalized email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredAccount {
    /// Normalized email (primary key).
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// PBKDF2 hash string, see [`crate::auth::password`].
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    /// Numbers of the records this account has linked.
    #[serde(default)]
    pub linked: LinkedCredentials,
}

impl StoredAccount {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            password_hash: password_hash.into(),
            role,
            created_at: Utc::now(),
            linked: LinkedCredentials::default(),
        }
    }
}

/// One slot per linkable credential kind.
///
/// Always kept equal to the `owner` field of the referenced records; both
/// sides are written in the same storage transaction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LinkedCredentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drivers_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_card: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transit_card: Option<String>,
}

impl LinkedCredentials {
    fn slot(&self, kind: CredentialKind) -> Option<&Option<String>> {
        match kind {
            CredentialKind::DriversLicense => Some(&self.drivers_license),
            CredentialKind::HealthCard => Some(&self.health_card),
            CredentialKind::TransitCard => Some(&self.transit_card),
            CredentialKind::CarRegistration | CredentialKind::CarInsurance => None,
        }
    }

    fn slot_mut(&mut self, kind: CredentialKind) -> Option<&mut Option<String>> {
        match kind {
            CredentialKind::DriversLicense => Some(&mut self.drivers_license),
            CredentialKind::HealthCard => Some(&mut self.health_card),
            CredentialKind::TransitCard => Some(&mut self.transit_card),
            CredentialKind::CarRegistration | CredentialKind::CarInsurance => None,
        }
    }

    /// Number of the linked record of this kind, if any.
    pub fn get(&self, kind: CredentialKind) -> Option<&str> {
        self.slot(kind).and_then(|slot| slot.as_deref())
    }

    /// Fill an empty slot. Returns `false` if the kind has no slot or the
    /// slot is already taken.
    pub fn set(&mut self, kind: CredentialKind, number: impl Into<String>) -> bool {
        match self.slot_mut(kind) {
            Some(slot) if slot.is_none() => {
                *slot = Some(number.into());
                true
            }
            _ => false,
        }
    }
}
