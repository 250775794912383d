// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential kind descriptor.
//!
//! Every per-kind difference (storage table, URL slug, user-facing names,
//! whether accounts may link it) lives here so the linking and lookup
//! routines stay generic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The identity documents known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    DriversLicense,
    HealthCard,
    TransitCard,
    CarRegistration,
    CarInsurance,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 5] = [
        CredentialKind::DriversLicense,
        CredentialKind::HealthCard,
        CredentialKind::TransitCard,
        CredentialKind::CarRegistration,
        CredentialKind::CarInsurance,
    ];

    /// Kinds an account may claim ownership of.
    pub const LINKABLE: [CredentialKind; 3] = [
        CredentialKind::DriversLicense,
        CredentialKind::HealthCard,
        CredentialKind::TransitCard,
    ];

    /// Stable snake_case identifier (serde name and table name).
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::DriversLicense => "drivers_license",
            CredentialKind::HealthCard => "health_card",
            CredentialKind::TransitCard => "transit_card",
            CredentialKind::CarRegistration => "car_registration",
            CredentialKind::CarInsurance => "car_insurance",
        }
    }

    /// URL path segment, e.g. `/v1/credentials/drivers-license/link`.
    pub fn slug(&self) -> &'static str {
        match self {
            CredentialKind::DriversLicense => "drivers-license",
            CredentialKind::HealthCard => "health-card",
            CredentialKind::TransitCard => "transit-card",
            CredentialKind::CarRegistration => "car-registration",
            CredentialKind::CarInsurance => "car-insurance",
        }
    }

    /// Human-readable name used in client-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            CredentialKind::DriversLicense => "Driver's license",
            CredentialKind::HealthCard => "Health card",
            CredentialKind::TransitCard => "Transit pass",
            CredentialKind::CarRegistration => "Car registration",
            CredentialKind::CarInsurance => "Car insurance policy",
        }
    }

    /// Name of the external number field, used in validation messages.
    pub fn number_label(&self) -> &'static str {
        match self {
            CredentialKind::DriversLicense | CredentialKind::CarRegistration => "License number",
            CredentialKind::HealthCard => "Health card number",
            CredentialKind::TransitCard => "Transit number",
            CredentialKind::CarInsurance => "Policy number",
        }
    }

    pub fn is_linkable(&self) -> bool {
        Self::LINKABLE.contains(self)
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = String;

    /// Accepts either the URL slug or the snake_case identifier.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug() == normalized)
            .ok_or_else(|| format!("Unknown credential kind: {s}"))
    }
}
