// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Account registration, login and bearer-token authentication.
//!
//! ## Auth Flow
//!
//! 1. Client registers with email + password (`POST /v1/auth/register`)
//! 2. Client logs in (`POST /v1/auth/login`) and receives an access token
//!    and a refresh token
//! 3. Client sends `Authorization: Bearer <access token>`
//! 4. Server:
//!    - Verifies the HS256 signature against `JWT_SECRET`
//!    - Checks expiry and that the token is an access token
//!    - Extracts:
//!      - `sub` → normalized account email
//!      - `role` → `client` or `admin`
//!
//! ## Security
//!
//! - Passwords are stored as salted PBKDF2-HMAC-SHA256 hashes
//! - Emails are NFKC-normalized and lowercased before any lookup
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod password;
pub mod roles;
pub mod tokens;

pub use claims::{AuthenticatedUser, TokenClaims, TokenType};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use password::{hash_password, normalize_email, verify_login, MIN_PASSWORD_LEN};
pub use roles::Role;
pub use tokens::{TokenIssuer, TokenPair};
