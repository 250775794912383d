// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Cipher
//!
//! Clients never send raw credential numbers to the lookup endpoints. They
//! send a base64 blob encrypted under a process-wide shared secret, which
//! this module turns back into a plaintext lookup key.
//!
//! ## Modes
//!
//! - `ecb` - AES-256-ECB with PKCS#7 padding. This is what deployed mobile
//!   clients produce. It has no IV, so equal plaintexts give equal
//!   ciphertexts, and it carries no integrity tag.
//! - `gcm` - AES-256-GCM with a random 96-bit nonce prepended to the
//!   ciphertext. New clients should use this mode.
//!
//! The shared secret is loaded once at startup (see [`crate::config`]) and
//! is never logged or echoed in errors.

pub mod cipher;
pub mod secret;

pub use cipher::{CipherError, CipherMode, CredentialCipher};
pub use secret::{SecretError, SharedSecret, KEY_LEN};
