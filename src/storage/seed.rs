// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup provisioning of credential records from a JSON seed file.
//!
//! ```json
//! {
//!   "credentials": [
//!     { "kind": "drivers_license", "number": "DL-123", "first_name": "Ada", ... }
//!   ]
//! }
//! ```
//!
//! Loading is idempotent: numbers that already exist are skipped, so the same
//! file can be passed on every restart.

use std::path::Path;

use serde::Deserialize;

use super::audit::{AuditEvent, AuditEventType};
use super::database::{CredentialStore, StoreError};
use crate::audit_log;
use crate::credentials::CredentialRecord;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub credentials: Vec<CredentialRecord>,
}

/// Counts reported after a seed run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub inserted: usize,
    pub existing: usize,
    pub rejected: usize,
}

/// Read a seed file and provision every record it lists.
pub fn load_seed_file(store: &CredentialStore, path: &Path) -> Result<SeedReport, SeedError> {
    let bytes = std::fs::read(path)?;
    let seed: SeedFile = serde_json::from_slice(&bytes)?;
    apply_seed(store, seed)
}

pub(crate) fn apply_seed(store: &CredentialStore, seed: SeedFile) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for mut record in seed.credentials {
        record.number = record.number.trim().to_string();
        match store.insert_credential(&record) {
            Ok(()) => {
                report.inserted += 1;
                audit_log!(
                    store,
                    AuditEvent::new(AuditEventType::CredentialProvisioned)
                        .with_resource(record.kind().as_str(), record.number.as_str())
                        .with_details(serde_json::json!({ "source": "seed" }))
                );
            }
            Err(StoreError::AlreadyExists(_)) => report.existing += 1,
            Err(StoreError::Integrity(reason)) => {
                tracing::warn!(
                    kind = %record.kind(),
                    number = %record.number,
                    reason = %reason,
                    "Skipping seed record"
                );
                report.rejected += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::CredentialKind;

    const SEED: &str = r#"{
        "credentials": [
            {
                "kind": "drivers_license",
                "number": "DL-123",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "province": "SK",
                "date_of_birth": "1990-12-10",
                "address": "12 Albert St",
                "expiration_date": "2030-01-01"
            },
            {
                "kind": "health_card",
                "number": "HC-9",
                "province": "SK",
                "expiration_date": "2029-06-30"
            },
            {
                "kind": "car_insurance",
                "number": "POL-1",
                "owner": "someone@x.com",
                "insurer": "SGI",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "address": "12 Albert St"
            }
        ]
    }"#;

    fn temp_store() -> (CredentialStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(&dir.path().join("seed.redb")).unwrap();
        (store, dir)
    }

    #[test]
    fn seed_is_idempotent_and_rejects_owned_records() {
        let (store, dir) = temp_store();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, SEED).unwrap();

        let first = load_seed_file(&store, &path).unwrap();
        assert_eq!(
            first,
            SeedReport {
                inserted: 2,
                existing: 0,
                rejected: 1
            }
        );

        let second = load_seed_file(&store, &path).unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.existing, 2);

        assert!(store
            .get_credential(CredentialKind::DriversLicense, "DL-123")
            .unwrap()
            .is_some());
        assert!(store
            .get_credential(CredentialKind::CarInsurance, "POL-1")
            .unwrap()
            .is_none());
    }

    #[test]
    fn seed_numbers_are_trimmed_and_blank_ones_rejected() {
        let (store, _dir) = temp_store();
        let seed: SeedFile = serde_json::from_str(
            r#"{
                "credentials": [
                    { "kind": "health_card", "number": " HC-7 ", "province": "SK", "expiration_date": "2029-06-30" },
                    { "kind": "health_card", "number": "  ", "province": "SK", "expiration_date": "2029-06-30" },
                    { "kind": "health_card", "number": "", "province": "SK", "expiration_date": "2029-06-30" }
                ]
            }"#,
        )
        .unwrap();

        let report = apply_seed(&store, seed).unwrap();
        assert_eq!(
            report,
            SeedReport {
                inserted: 1,
                existing: 0,
                rejected: 2
            }
        );

        assert!(store
            .get_credential(CredentialKind::HealthCard, "")
            .unwrap()
            .is_none());
        let found = crate::credentials::find(
            &store,
            CredentialKind::HealthCard,
            Some(" HC-7 "),
            None,
        )
        .unwrap();
        assert_eq!(found.number, "HC-7");
    }

    #[test]
    fn malformed_seed_is_an_error() {
        let (store, dir) = temp_store();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_seed_file(&store, &path),
            Err(SeedError::Parse(_))
        ));
    }

    #[test]
    fn missing_seed_file_is_an_error() {
        let (store, dir) = temp_store();
        assert!(matches!(
            load_seed_file(&store, &dir.path().join("absent.json")),
            Err(SeedError::Io(_))
        ));
    }
}
