// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashSet;
use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::crypto::CredentialCipher;
use crate::storage::CredentialStore;

/// Shared application state, cloned into every handler.
///
/// Everything here is immutable after startup except the database, which
/// serializes its own writes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CredentialStore>,
    pub cipher: Arc<CredentialCipher>,
    pub tokens: Arc<TokenIssuer>,
    /// Normalized emails that receive the admin role at registration.
    pub admin_emails: Arc<HashSet<String>>,
}

impl AppState {
    pub fn new(store: CredentialStore, cipher: CredentialCipher, tokens: TokenIssuer) -> Self {
        Self {
            store: Arc::new(store),
            cipher: Arc::new(cipher),
            tokens: Arc::new(tokens),
            admin_emails: Arc::new(HashSet::new()),
        }
    }

    pub fn with_admin_emails(mut self, admin_emails: HashSet<String>) -> Self {
        self.admin_emails = Arc::new(admin_emails);
        self
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(email)
    }
}

#[cfg(test)]
impl AppState {
    /// State over a fresh temporary database, ECB cipher with a fixed key,
    /// and `admin@x.com` as the only admin email.
    pub(crate) fn for_tests() -> (Self, tempfile::TempDir) {
        use crate::crypto::{CipherMode, SharedSecret};

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = CredentialStore::open(&dir.path().join("state.redb"))
            .expect("Failed to open test database");
        let secret = SharedSecret::from_bytes(&[42u8; 32]).expect("Invalid test key");
        let cipher = CredentialCipher::new(CipherMode::Ecb, secret);
        let tokens = TokenIssuer::new(b"unit-test-jwt-secret-0123456789ab", 300, 3_600);

        let state = Self::new(store, cipher, tokens)
            .with_admin_emails(HashSet::from(["admin@x.com".to_string()]));
        (state, dir)
    }
}
