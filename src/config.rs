// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup into a
//! [`Config`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the redb database | `./data` |
//! | `CREDENTIAL_KEY` | Base64 32-byte shared secret for credential ciphertexts | Required (or `CREDENTIAL_KEY_FILE`) |
//! | `CREDENTIAL_KEY_FILE` | File holding the base64 shared secret | Optional |
//! | `CREDENTIAL_CIPHER_MODE` | `ecb` (legacy clients) or `gcm` | `ecb` |
//! | `JWT_SECRET` | HMAC secret for access/refresh tokens | Random per process |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime | `300` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime | `86400` |
//! | `ADMIN_EMAILS` | Comma-separated emails that register as admins | Empty |
//! | `SEED_FILE` | JSON file of credential records to provision at startup | Optional |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | Optional |
//! | `TLS_KEY_PATH` | PEM private key | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashSet;
use std::path::PathBuf;

use crate::auth::normalize_email;
use crate::crypto::{CipherMode, SecretError, SharedSecret};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
///
/// # Default
/// `./data`
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const CREDENTIAL_KEY_ENV: &str = "CREDENTIAL_KEY";
pub const CREDENTIAL_KEY_FILE_ENV: &str = "CREDENTIAL_KEY_FILE";
pub const CREDENTIAL_CIPHER_MODE_ENV: &str = "CREDENTIAL_CIPHER_MODE";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TOKEN_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const ADMIN_EMAILS_ENV: &str = "ADMIN_EMAILS";
pub const SEED_FILE_ENV: &str = "SEED_FILE";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 300;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 86_400;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CREDENTIAL_KEY or CREDENTIAL_KEY_FILE must be set")]
    MissingCredentialKey,

    #[error("invalid credential key: {0}")]
    CredentialKey(#[from] SecretError),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,
}

/// TLS certificate and key locations.
#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Fully parsed runtime configuration.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub credential_key: SharedSecret,
    pub cipher_mode: CipherMode,
    /// `None` means a random secret is generated at startup.
    pub jwt_secret: Option<Vec<u8>>,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub admin_emails: HashSet<String>,
    pub seed_file: Option<PathBuf>,
    pub tls: Option<TlsPaths>,
    pub json_logs: bool,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credential_key = match (var(CREDENTIAL_KEY_ENV), var(CREDENTIAL_KEY_FILE_ENV)) {
            (Some(encoded), _) => SharedSecret::from_base64(&encoded)?,
            (None, Some(path)) => SharedSecret::from_file(path)?,
            (None, None) => return Err(ConfigError::MissingCredentialKey),
        };

        let cipher_mode = match var(CREDENTIAL_CIPHER_MODE_ENV) {
            Some(raw) => raw.parse().map_err(|reason| ConfigError::Invalid {
                name: CREDENTIAL_CIPHER_MODE_ENV,
                reason,
            })?,
            None => CipherMode::default(),
        };

        let tls = match (var(TLS_CERT_PATH_ENV), var(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let admin_emails = var(ADMIN_EMAILS_ENV)
            .map(|raw| {
                raw.split(',')
                    .map(normalize_email)
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(var(PORT_ENV), PORT_ENV, DEFAULT_PORT)?,
            data_dir: var(DATA_DIR_ENV)
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            credential_key,
            cipher_mode,
            jwt_secret: var(JWT_SECRET_ENV).map(String::into_bytes),
            access_token_ttl_secs: parse_or(
                var(ACCESS_TOKEN_TTL_ENV),
                ACCESS_TOKEN_TTL_ENV,
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?,
            refresh_token_ttl_secs: parse_or(
                var(REFRESH_TOKEN_TTL_ENV),
                REFRESH_TOKEN_TTL_ENV,
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?,
            admin_emails,
            seed_file: var(SEED_FILE_ENV).map(PathBuf::from),
            tls,
            json_logs: var(LOG_FORMAT_ENV)
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("data_dir", &self.data_dir)
            .field("credential_key", &self.credential_key)
            .field("cipher_mode", &self.cipher_mode)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("admin_emails", &self.admin_emails)
            .field("seed_file", &self.seed_file)
            .field("tls", &self.tls)
            .field("json_logs", &self.json_logs)
            .finish()
    }
}

fn parse_or<T>(raw: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
