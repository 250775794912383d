// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded credential database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `accounts`: normalized email → serialized StoredAccount
//! - `drivers_license`, `health_card`, `transit_card`, `car_registration`,
//!   `car_insurance`: record number → serialized CredentialRecord
//! - `audit_events`: `micros-event_id` → serialized AuditEvent
//!
//! redb allows a single write transaction at a time, so any read-check-write
//! sequence performed inside one write transaction is atomic with respect to
//! every other writer. [`CredentialStore::claim_credential`] relies on this.

use std::path::Path;

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};

use super::accounts::StoredAccount;
use super::audit::AuditEvent;
use crate::credentials::{CredentialKind, CredentialRecord};

// =============================================================================
// Table Definitions
// =============================================================================

type JsonTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Accounts: normalized email → StoredAccount (JSON bytes).
const ACCOUNTS: JsonTable = TableDefinition::new("accounts");

const DRIVERS_LICENSES: JsonTable = TableDefinition::new("drivers_license");
const HEALTH_CARDS: JsonTable = TableDefinition::new("health_card");
const TRANSIT_CARDS: JsonTable = TableDefinition::new("transit_card");
const CAR_REGISTRATIONS: JsonTable = TableDefinition::new("car_registration");
const CAR_INSURANCE: JsonTable = TableDefinition::new("car_insurance");

/// Audit log: time-ordered key → AuditEvent (JSON bytes).
const AUDIT_EVENTS: JsonTable = TableDefinition::new("audit_events");

fn credential_table(kind: CredentialKind) -> JsonTable {
    match kind {
        CredentialKind::DriversLicense => DRIVERS_LICENSES,
        CredentialKind::HealthCard => HEALTH_CARDS,
        CredentialKind::TransitCard => TRANSIT_CARDS,
        CredentialKind::CarRegistration => CAR_REGISTRATIONS,
        CredentialKind::CarInsurance => CAR_INSURANCE,
    }
}

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("integrity violation: {0}")]
    Integrity(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of the atomic "claim if unowned" operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Owner was unset and is now the account; both sides persisted.
    Claimed(CredentialRecord),
    /// The kind has no account slot.
    NotLinkable,
    RecordNotFound,
    AccountNotFound,
    /// The record already has an owner (any owner, including the caller).
    AlreadyOwned,
    /// The account already holds a different record of this kind.
    AccountSlotTaken { existing: String },
}

// =============================================================================
// CredentialStore
// =============================================================================

/// Embedded ACID store for accounts, credential records and audit events.
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(ACCOUNTS)?;
            let _ = write_txn.open_table(AUDIT_EVENTS)?;
            for kind in CredentialKind::ALL {
                let _ = write_txn.open_table(credential_table(kind))?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Cheap readiness probe: open a read transaction and one table.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(ACCOUNTS)?;
        Ok(())
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Insert a new account. Fails with `AlreadyExists` if the email is taken.
    pub fn create_account(&self, account: &StoredAccount) -> StoreResult<()> {
        let json = serde_json::to_vec(account)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ACCOUNTS)?;
            if table.get(account.email.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!(
                    "Account {}",
                    account.email
                )));
            }
            table.insert(account.email.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up an account by normalized email.
    pub fn get_account(&self, email: &str) -> StoreResult<Option<StoredAccount>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(email)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // =========================================================================
    // Credential Records
    // =========================================================================

    /// Provision a new, unowned record.
    ///
    /// Records with an owner are rejected: ownership is only ever assigned
    /// through [`claim_credential`](Self::claim_credential).
    pub fn insert_credential(&self, record: &CredentialRecord) -> StoreResult<()> {
        if record.number.is_empty() || record.number.trim() != record.number {
            return Err(StoreError::Integrity(format!(
                "{} number must be non-empty and trimmed",
                record.kind()
            )));
        }
        if record.is_linked() {
            return Err(StoreError::Integrity(format!(
                "{} {} must be provisioned without an owner",
                record.kind(),
                record.number
            )));
        }
        let json = serde_json::to_vec(record)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(credential_table(record.kind()))?;
            if table.get(record.number.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!(
                    "{} {}",
                    record.kind(),
                    record.number
                )));
            }
            table.insert(record.number.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Look up a record by kind and external number.
    pub fn get_credential(
        &self,
        kind: CredentialKind,
        number: &str,
    ) -> StoreResult<Option<CredentialRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(credential_table(kind))?;
        match table.get(number)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Atomically assign `email` as owner of an unowned record.
    ///
    /// The ownership check, the account slot check and both writes happen in
    /// one write transaction. Any outcome other than `Claimed` aborts the
    /// transaction, leaving storage untouched.
    pub fn claim_credential(
        &self,
        kind: CredentialKind,
        number: &str,
        email: &str,
    ) -> StoreResult<ClaimOutcome> {
        if !kind.is_linkable() {
            return Ok(ClaimOutcome::NotLinkable);
        }

        let write_txn = self.db.begin_write()?;
        let outcome = claim_in(&write_txn, kind, number, email)?;

        if matches!(outcome, ClaimOutcome::Claimed(_)) {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(outcome)
    }

    // =========================================================================
    // Audit
    // =========================================================================

    /// Append an audit event.
    pub fn append_audit(&self, event: &AuditEvent) -> StoreResult<()> {
        let json = serde_json::to_vec(event)?;
        let key = event.storage_key();

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(AUDIT_EVENTS)?;
            table.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Most recent audit events, newest first.
    pub fn recent_audit(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AUDIT_EVENTS)?;

        let mut events = Vec::with_capacity(limit.min(256));
        for entry in table.iter()?.rev().take(limit) {
            let (_, value) = entry?;
            events.push(serde_json::from_slice(value.value())?);
        }
        Ok(events)
    }
}

fn claim_in(
    txn: &WriteTransaction,
    kind: CredentialKind,
    number: &str,
    email: &str,
) -> StoreResult<ClaimOutcome> {
    let mut records = txn.open_table(credential_table(kind))?;
    let mut record: CredentialRecord = {
        let Some(existing) = records.get(number)? else {
            return Ok(ClaimOutcome::RecordNotFound);
        };
        serde_json::from_slice(existing.value())?
    };

    if record.owner.is_some() {
        return Ok(ClaimOutcome::AlreadyOwned);
    }

    let mut accounts = txn.open_table(ACCOUNTS)?;
    let mut account: StoredAccount = {
        let Some(existing) = accounts.get(email)? else {
            return Ok(ClaimOutcome::AccountNotFound);
        };
        serde_json::from_slice(existing.value())?
    };

    if let Some(existing) = account.linked.get(kind) {
        return Ok(ClaimOutcome::AccountSlotTaken {
            existing: existing.to_string(),
        });
    }

    record.owner = Some(account.email.clone());
    if !account.linked.set(kind, number) {
        return Err(StoreError::Integrity(format!(
            "account {} has no {kind} slot",
            account.email
        )));
    }

    let record_json = serde_json::to_vec(&record)?;
    let account_json = serde_json::to_vec(&account)?;
    records.insert(number, record_json.as_slice())?;
    accounts.insert(account.email.as_str(), account_json.as_slice())?;

    Ok(ClaimOutcome::Claimed(record))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::Role;
    use crate::credentials::record::fixtures;
    use crate::storage::AuditEventType;

    fn temp_store() -> (CredentialStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::open(&dir.path().join("test.redb")).unwrap();
        (store, dir)
    }

    fn account(email: &str) -> StoredAccount {
        StoredAccount::new(email, "Test", "User", "hash", Role::Client)
    }

    #[test]
    fn create_and_get_account() {
        let (store, _dir) = temp_store();
        store.create_account(&account("a@x.com")).unwrap();

        let loaded = store.get_account("a@x.com").unwrap().unwrap();
        assert_eq!(loaded.email, "a@x.com");
        assert!(store.get_account("missing@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_account_rejected() {
        let (store, _dir) = temp_store();
        store.create_account(&account("a@x.com")).unwrap();

        let result = store.create_account(&account("a@x.com"));
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
    }

    #[test]
    fn insert_and_get_credential_per_kind() {
        let (store, _dir) = temp_store();
        store.insert_credential(&fixtures::drivers_license("X-1")).unwrap();
        store.insert_credential(&fixtures::health_card("X-1")).unwrap();

        let dl = store
            .get_credential(CredentialKind::DriversLicense, "X-1")
            .unwrap()
            .unwrap();
        assert_eq!(dl.kind(), CredentialKind::DriversLicense);

        let hc = store
            .get_credential(CredentialKind::HealthCard, "X-1")
            .unwrap()
            .unwrap();
        assert_eq!(hc.kind(), CredentialKind::HealthCard);

        assert!(store
            .get_credential(CredentialKind::TransitCard, "X-1")
            .unwrap()
            .is_none());
    }

    #[test]
    fn insert_rejects_duplicates_and_owned_records() {
        let (store, _dir) = temp_store();
        store.insert_credential(&fixtures::transit_card("TC-1")).unwrap();
        assert!(matches!(
            store.insert_credential(&fixtures::transit_card("TC-1")),
            Err(StoreError::AlreadyExists(_))
        ));

        let mut owned = fixtures::transit_card("TC-2");
        owned.owner = Some("a@x.com".into());
        assert!(matches!(
            store.insert_credential(&owned),
            Err(StoreError::Integrity(_))
        ));
    }

    #[test]
    fn insert_rejects_blank_or_padded_numbers() {
        let (store, _dir) = temp_store();
        for number in ["", "   ", " HC-7 "] {
            assert!(
                matches!(
                    store.insert_credential(&fixtures::health_card(number)),
                    Err(StoreError::Integrity(_))
                ),
                "{number:?}"
            );
        }
        assert!(store
            .get_credential(CredentialKind::HealthCard, " HC-7 ")
            .unwrap()
            .is_none());
    }

    #[test]
    fn claim_sets_both_sides() {
        let (store, _dir) = temp_store();
        store.create_account(&account("a@x.com")).unwrap();
        store.insert_credential(&fixtures::drivers_license("DL-123")).unwrap();

        let outcome = store
            .claim_credential(CredentialKind::DriversLicense, "DL-123", "a@x.com")
            .unwrap();
        let ClaimOutcome::Claimed(record) = outcome else {
            panic!("expected claim, got {outcome:?}");
        };
        assert_eq!(record.owner.as_deref(), Some("a@x.com"));

        let stored = store
            .get_credential(CredentialKind::DriversLicense, "DL-123")
            .unwrap()
            .unwrap();
        assert_eq!(stored.owner.as_deref(), Some("a@x.com"));

        let acct = store.get_account("a@x.com").unwrap().unwrap();
        assert_eq!(acct.linked.get(CredentialKind::DriversLicense), Some("DL-123"));
    }

    #[test]
    fn claim_rejections_leave_storage_untouched() {
        let (store, _dir) = temp_store();
        store.create_account(&account("a@x.com")).unwrap();
        store.create_account(&account("b@y.com")).unwrap();
        store.insert_credential(&fixtures::health_card("HC-1")).unwrap();
        store.insert_credential(&fixtures::health_card("HC-2")).unwrap();

        assert_eq!(
            store
                .claim_credential(CredentialKind::HealthCard, "HC-404", "a@x.com")
                .unwrap(),
            ClaimOutcome::RecordNotFound
        );
        assert_eq!(
            store
                .claim_credential(CredentialKind::HealthCard, "HC-1", "ghost@x.com")
                .unwrap(),
            ClaimOutcome::AccountNotFound
        );
        assert_eq!(
            store
                .claim_credential(CredentialKind::CarInsurance, "POL-1", "a@x.com")
                .unwrap(),
            ClaimOutcome::NotLinkable
        );

        assert!(matches!(
            store
                .claim_credential(CredentialKind::HealthCard, "HC-1", "a@x.com")
                .unwrap(),
            ClaimOutcome::Claimed(_)
        ));
        assert_eq!(
            store
                .claim_credential(CredentialKind::HealthCard, "HC-1", "b@y.com")
                .unwrap(),
            ClaimOutcome::AlreadyOwned
        );
        assert_eq!(
            store
                .claim_credential(CredentialKind::HealthCard, "HC-2", "a@x.com")
                .unwrap(),
            ClaimOutcome::AccountSlotTaken {
                existing: "HC-1".to_string()
            }
        );

        let hc2 = store
            .get_credential(CredentialKind::HealthCard, "HC-2")
            .unwrap()
            .unwrap();
        assert!(hc2.owner.is_none());
        let b = store.get_account("b@y.com").unwrap().unwrap();
        assert_eq!(b.linked.get(CredentialKind::HealthCard), None);
    }

    #[test]
    fn parallel_claims_have_single_winner() {
        let (store, _dir) = temp_store();
        let store = Arc::new(store);
        let emails: Vec<String> = (0..16).map(|i| format!("user{i}@x.com")).collect();
        for email in &emails {
            store.create_account(&account(email)).unwrap();
        }
        store.insert_credential(&fixtures::transit_card("TC-RACE")).unwrap();

        let outcomes: Vec<ClaimOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = emails
                .iter()
                .map(|email| {
                    let store = Arc::clone(&store);
                    scope.spawn(move || {
                        store
                            .claim_credential(CredentialKind::TransitCard, "TC-RACE", email)
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winners: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match o {
                ClaimOutcome::Claimed(record) => record.owner.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(winners.len(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| **o == ClaimOutcome::AlreadyOwned)
                .count(),
            emails.len() - 1
        );

        let stored = store
            .get_credential(CredentialKind::TransitCard, "TC-RACE")
            .unwrap()
            .unwrap();
        assert_eq!(stored.owner, Some(winners[0].clone()));

        let linked_accounts = emails
            .iter()
            .filter(|email| {
                store
                    .get_account(email)
                    .unwrap()
                    .unwrap()
                    .linked
                    .get(CredentialKind::TransitCard)
                    .is_some()
            })
            .count();
        assert_eq!(linked_accounts, 1);
    }

    #[test]
    fn audit_events_listed_newest_first() {
        let (store, _dir) = temp_store();
        for (i, event_type) in [
            AuditEventType::AccountRegistered,
            AuditEventType::LoginSucceeded,
            AuditEventType::CredentialLinked,
        ]
        .into_iter()
        .enumerate()
        {
            let mut event = AuditEvent::new(event_type);
            event.timestamp = chrono::DateTime::from_timestamp(1_700_000_000 + i as i64, 0).unwrap();
            store.append_audit(&event).unwrap();
        }

        let events = store.recent_audit(2).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, AuditEventType::CredentialLinked);
        assert_eq!(events[1].event_type, AuditEventType::LoginSucceeded);
    }
}
