// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential record types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::kind::CredentialKind;

/// A pre-provisioned identity document.
///
/// `number` is unique within its kind. `owner` holds the normalized email of
/// the account that linked the record; once set it is never overwritten.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CredentialRecord {
    /// External document number (license, card or policy number).
    pub number: String,
    /// Email of the owning account, if linked.
    #[serde(default)]
    pub owner: Option<String>,
    /// Kind-specific attributes, tagged by `kind`.
    #[serde(flatten)]
    pub details: CredentialDetails,
}

impl CredentialRecord {
    /// Create an unowned record.
    pub fn new(number: impl Into<String>, details: CredentialDetails) -> Self {
        Self {
            number: number.into(),
            owner: None,
            details,
        }
    }

    pub fn kind(&self) -> CredentialKind {
        self.details.kind()
    }

    pub fn is_linked(&self) -> bool {
        self.owner.is_some()
    }
}

/// Kind-specific attributes of a credential record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CredentialDetails {
    DriversLicense(DriversLicenseDetails),
    HealthCard(HealthCardDetails),
    TransitCard(TransitCardDetails),
    CarRegistration(CarRegistrationDetails),
    CarInsurance(CarInsuranceDetails),
}

impl CredentialDetails {
    pub fn kind(&self) -> CredentialKind {
        match self {
            CredentialDetails::DriversLicense(_) => CredentialKind::DriversLicense,
            CredentialDetails::HealthCard(_) => CredentialKind::HealthCard,
            CredentialDetails::TransitCard(_) => CredentialKind::TransitCard,
            CredentialDetails::CarRegistration(_) => CredentialKind::CarRegistration,
            CredentialDetails::CarInsurance(_) => CredentialKind::CarInsurance,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DriversLicenseDetails {
    pub first_name: String,
    pub last_name: String,
    pub province: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub expiration_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct HealthCardDetails {
    pub province: String,
    pub expiration_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TransitCardDetails {
    /// Stored value in cents.
    pub balance_cents: i64,
    pub expiration_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CarRegistrationDetails {
    pub first_name: String,
    pub last_name: String,
    pub vin: String,
    pub make: String,
    pub model: String,
    pub date_issued: NaiveDate,
    pub expiration_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CarInsuranceDetails {
    pub insurer: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}
