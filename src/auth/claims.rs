// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated admin representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Claims carried by an admin session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminClaims {
    /// Admin identifier
    pub sub: String,
    pub username: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Authenticated admin extracted from a verified session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    pub admin_id: String,
    pub username: String,
}

impl From<AdminClaims> for AuthenticatedAdmin {
    fn from(claims: AdminClaims) -> Self {
        Self {
            admin_id: claims.sub,
            username: claims.username,
        }
    }
}
