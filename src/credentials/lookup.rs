// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read path: find a record by number or by the email of its owner.

use super::error::CredentialError;
use super::kind::CredentialKind;
use super::record::CredentialRecord;
use crate::auth::normalize_email;
use crate::crypto::CredentialCipher;
use crate::storage::CredentialStore;

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Find a record of `kind`.
///
/// `number` wins when both arguments are given. Empty strings count as
/// absent.
pub fn find(
    store: &CredentialStore,
    kind: CredentialKind,
    number: Option<&str>,
    email: Option<&str>,
) -> Result<CredentialRecord, CredentialError> {
    if let Some(number) = present(number) {
        return store
            .get_credential(kind, number)?
            .ok_or(CredentialError::NotFound(kind));
    }

    let Some(email) = present(email) else {
        return Err(CredentialError::MissingParameter(format!(
            "{} or email",
            kind.number_label()
        )));
    };

    if !kind.is_linkable() {
        return Err(CredentialError::NotLinkable(kind));
    }

    let account = store
        .get_account(&normalize_email(email))?
        .ok_or(CredentialError::AccountNotFound)?;
    let linked = account
        .linked
        .get(kind)
        .ok_or(CredentialError::NotFound(kind))?;

    store
        .get_credential(kind, linked)?
        .ok_or(CredentialError::NotFound(kind))
}

/// Decrypt a client ciphertext and look up the record it names.
pub fn decrypt_and_find(
    store: &CredentialStore,
    cipher: &CredentialCipher,
    kind: CredentialKind,
    ciphertext: &str,
) -> Result<CredentialRecord, CredentialError> {
    let number = cipher.decrypt(ciphertext)?;
    if number.trim().is_empty() {
        return Err(CredentialError::NotFound(kind));
    }
    find(store, kind, Some(&number), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::credentials::linker::link;
    use crate::credentials::record::fixtures;
    use crate::crypto::{CipherMode, SharedSecret};
    use crate::storage::StoredAccount;

    fn seeded_store() -> (CredentialStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(&dir.path().join("lookup.redb")).unwrap();
        for email in ["a@x.com", "y@z.com"] {
            store
                .create_account(&StoredAccount::new(email, "T", "U", "hash", Role::Client))
                .unwrap();
        }
        store.insert_credential(&fixtures::drivers_license("X")).unwrap();
        store.insert_credential(&fixtures::drivers_license("Y")).unwrap();
        store.insert_credential(&fixtures::car_insurance("POL-1")).unwrap();
        link(&store, "y@z.com", CredentialKind::DriversLicense, "Y").unwrap();
        (store, dir)
    }

    fn cipher(mode: CipherMode) -> CredentialCipher {
        CredentialCipher::new(mode, SharedSecret::from_bytes(&[7u8; 32]).unwrap())
    }

    #[test]
    fn number_takes_precedence_over_email() {
        let (store, _dir) = seeded_store();
        let record = find(
            &store,
            CredentialKind::DriversLicense,
            Some("X"),
            Some("y@z.com"),
        )
        .unwrap();
        assert_eq!(record.number, "X");
    }

    #[test]
    fn finds_by_owner_email() {
        let (store, _dir) = seeded_store();
        let record = find(&store, CredentialKind::DriversLicense, None, Some(" Y@Z.com ")).unwrap();
        assert_eq!(record.number, "Y");
        assert_eq!(record.owner.as_deref(), Some("y@z.com"));
    }

    #[test]
    fn empty_strings_count_as_absent() {
        let (store, _dir) = seeded_store();
        let record = find(&store, CredentialKind::DriversLicense, Some(""), Some("y@z.com")).unwrap();
        assert_eq!(record.number, "Y");

        assert!(matches!(
            find(&store, CredentialKind::DriversLicense, Some(""), Some("")),
            Err(CredentialError::MissingParameter(_))
        ));
    }

    #[test]
    fn missing_parameters() {
        let (store, _dir) = seeded_store();
        let err = find(&store, CredentialKind::HealthCard, None, None).unwrap_err();
        assert_eq!(err.to_string(), "Health card number or email is required");
    }

    #[test]
    fn not_found_cases() {
        let (store, _dir) = seeded_store();
        assert!(matches!(
            find(&store, CredentialKind::DriversLicense, Some("NOPE"), None),
            Err(CredentialError::NotFound(_))
        ));
        assert!(matches!(
            find(&store, CredentialKind::DriversLicense, None, Some("ghost@x.com")),
            Err(CredentialError::AccountNotFound)
        ));
        assert!(matches!(
            find(&store, CredentialKind::DriversLicense, None, Some("a@x.com")),
            Err(CredentialError::NotFound(_))
        ));
        assert!(matches!(
            find(&store, CredentialKind::CarInsurance, None, Some("a@x.com")),
            Err(CredentialError::NotLinkable(_))
        ));
    }

    #[test]
    fn lookup_only_kinds_resolve_by_number() {
        let (store, _dir) = seeded_store();
        let record = find(&store, CredentialKind::CarInsurance, Some("POL-1"), None).unwrap();
        assert_eq!(record.kind(), CredentialKind::CarInsurance);
    }

    #[test]
    fn decrypt_then_find_in_both_modes() {
        let (store, _dir) = seeded_store();
        for mode in [CipherMode::Ecb, CipherMode::Gcm] {
            let cipher = cipher(mode);
            let blob = cipher.encrypt("X").unwrap();
            let record =
                decrypt_and_find(&store, &cipher, CredentialKind::DriversLicense, &blob).unwrap();
            assert_eq!(record.number, "X");
        }
    }

    #[test]
    fn decrypt_failures_are_decryption_errors() {
        let (store, _dir) = seeded_store();
        let cipher = cipher(CipherMode::Ecb);

        assert!(matches!(
            decrypt_and_find(&store, &cipher, CredentialKind::DriversLicense, "%%%"),
            Err(CredentialError::Decryption(_))
        ));

        let other_key = CredentialCipher::new(
            CipherMode::Gcm,
            SharedSecret::from_bytes(&[9u8; 32]).unwrap(),
        );
        let blob = other_key.encrypt("X").unwrap();
        let gcm = self::cipher(CipherMode::Gcm);
        assert!(matches!(
            decrypt_and_find(&store, &gcm, CredentialKind::DriversLicense, &blob),
            Err(CredentialError::Decryption(_))
        ));
    }

    #[test]
    fn decrypted_unknown_number_is_not_found() {
        let (store, _dir) = seeded_store();
        let cipher = cipher(CipherMode::Ecb);
        let blob = cipher.encrypt("DL-UNKNOWN").unwrap();
        assert!(matches!(
            decrypt_and_find(&store, &cipher, CredentialKind::DriversLicense, &blob),
            Err(CredentialError::NotFound(_))
        ));
    }
}
