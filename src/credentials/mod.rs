// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credentials
//!
//! Identity-document records and the two flows that touch them:
//!
//! - **Linking**: an authenticated account claims a record once. Ownership
//!   is assigned by a single conditional write in storage, never by a
//!   separate read followed by a write.
//! - **Lookup**: by external number, by owner email, or by a ciphertext
//!   that decrypts to the external number.
//!
//! All kinds share one code path, parameterized by [`CredentialKind`].

pub mod error;
pub mod kind;
pub mod linker;
pub mod lookup;
pub mod record;

pub use error::{CredentialError, DECRYPTION_FAILED_MESSAGE};
pub use kind::CredentialKind;
pub use linker::link;
pub use lookup::{decrypt_and_find, find};
pub use record::{
    CarInsuranceDetails, CarRegistrationDetails, CredentialDetails, CredentialRecord,
    DriversLicenseDetails, HealthCardDetails, TransitCardDetails,
};
