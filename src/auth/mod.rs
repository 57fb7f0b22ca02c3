// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Admin authentication for the member registry API.
//!
//! ## Auth Flow
//!
//! 1. An admin account is provisioned out-of-band (`create-admin`).
//! 2. `POST /auth/login` verifies the bcrypt password hash and returns an
//!    HS256 session token with claims `sub`, `username`, `iat`, `exp`.
//! 3. Callers send `Authorization: Bearer <token>`; the [`AdminAuth`]
//!    extractor (or [`middleware::require_admin`]) verifies signature and
//!    expiry.
//!
//! ## Security
//!
//! - Unknown usernames and wrong passwords produce identical responses
//! - bcrypt runs on the blocking pool
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod middleware;
pub mod password;
pub mod service;
pub mod tokens;

pub use claims::{AdminClaims, AuthenticatedAdmin};
pub use error::AuthError;
pub use extractor::AdminAuth;
pub use service::{login, provision_admin, ProvisionOutcome};
pub use tokens::TokenKeys;
