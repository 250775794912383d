// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 access and refresh tokens.
//!
//! Access tokens are short-lived and authorize API calls. Refresh tokens are
//! only accepted by `POST /v1/auth/token/refresh` to mint a new access token.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{TokenClaims, TokenType};
use super::error::AuthError;
use super::roles::Role;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Signs and verifies tokens with a single HMAC secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

/// Freshly issued token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], access_ttl_secs: u64, refresh_ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl_secs: i64::try_from(access_ttl_secs).unwrap_or(i64::MAX),
            refresh_ttl_secs: i64::try_from(refresh_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue one token of the given type.
    pub fn issue(&self, email: &str, role: Role, token_type: TokenType) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl_secs,
            TokenType::Refresh => self.refresh_ttl_secs,
        };
        let claims = TokenClaims {
            sub: email.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
            token_type,
            jti: uuid::Uuid::new_v4().to_string(),
            role,
        };
        self.sign(&claims)
    }

    /// Issue an access and a refresh token for the same account.
    pub fn issue_pair(&self, email: &str, role: Role) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(email, role, TokenType::Access)?,
            refresh: self.issue(email, role, TokenType::Refresh)?,
        })
    }

    /// Verify signature and expiry, and require the given token type.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)?.claims;
        if claims.token_type != expected {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }

    pub(crate) fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(e.to_string()))
    }
}
