// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Storage Module
//!
//! Persistent storage for accounts, identity-document records and the audit
//! trail, backed by a single embedded [redb](https://docs.rs/redb) database.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   digitalid.redb     # accounts, one table per credential kind, audit_events
//! ```
//!
//! ## Ownership Model
//!
//! - Records are provisioned unowned (seed file or admin endpoint)
//! - An account claims a record exactly once; the record `owner` and the
//!   account slot are written in the same write transaction
//! - Nothing in this module ever clears or overwrites an owner

pub mod accounts;
pub mod audit;
pub mod database;
pub mod seed;

pub use accounts::{LinkedCredentials, StoredAccount};
pub use audit::{AuditEvent, AuditEventType};
pub use database::{ClaimOutcome, CredentialStore, StoreError, StoreResult};
pub use seed::{load_seed_file, SeedError, SeedFile, SeedReport};

/// File name of the database inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "digitalid.redb";
