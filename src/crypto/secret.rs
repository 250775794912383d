// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared symmetric secret used by the credential cipher.

use std::fmt;
use std::path::Path;

use base64ct::{Base64, Encoding};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of the shared secret in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Errors raised while loading the shared secret.
///
/// None of the variants carry key material.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("shared secret must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("shared secret is not valid base64")]
    Encoding,

    #[error("failed to read shared secret file: {0}")]
    Io(#[from] std::io::Error),
}

/// Process-wide AES-256 key.
///
/// Wiped from memory on drop. `Debug` never prints the bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; KEY_LEN]);

impl SharedSecret {
    /// Build a secret from raw key bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SecretError> {
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|_| SecretError::InvalidLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(key))
    }

    /// Build a secret from standard (padded) base64 text.
    pub fn from_base64(encoded: &str) -> Result<Self, SecretError> {
        let mut bytes = Base64::decode_vec(encoded.trim()).map_err(|_| SecretError::Encoding)?;
        let secret = Self::from_bytes(&bytes);
        bytes.zeroize();
        secret
    }

    /// Read a base64-encoded secret from a file (e.g. a mounted secret volume).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SecretError> {
        let mut contents = std::fs::read_to_string(path)?;
        let secret = Self::from_base64(&contents);
        contents.zeroize();
        secret
    }

    pub(crate) fn expose(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}
