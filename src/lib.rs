// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Digital ID - Credential Linking Service
//!
//! This crate exposes pre-provisioned identity-document records over a REST
//! API, resolves them from client-encrypted lookup keys, and lets each
//! record be linked to exactly one registered account.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Registration, password hashing and bearer tokens
//! - `credentials` - Credential kinds, records, linking and lookup
//! - `crypto` - Shared-secret cipher for client lookup keys
//! - `storage` - Embedded database (redb), seed loading, audit trail

pub mod api;
pub mod auth;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
