// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuing and verification (HS256).

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{claims::AdminClaims, AuthError, AuthenticatedAdmin};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Signing material and lifetime for admin session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    expires_in_secs: u64,
}

impl fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenKeys")
            .field("expires_in_secs", &self.expires_in_secs)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    pub fn new(secret: &str, expires_in_secs: u64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            expires_in_secs,
        }
    }

    /// Issue a token for `admin`, valid from now for the configured lifetime.
    pub fn issue(&self, admin: &AuthenticatedAdmin) -> Result<String, AuthError> {
        let iat = Utc::now().timestamp();
        let lifetime = i64::try_from(self.expires_in_secs).unwrap_or(i64::MAX);
        self.issue_claims(&AdminClaims {
            sub: admin.admin_id.clone(),
            username: admin.username.clone(),
            iat,
            exp: iat.saturating_add(lifetime),
        })
    }

    pub(crate) fn issue_claims(&self, claims: &AdminClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::InternalError(format!("failed to sign token: {e}")))
    }

    /// Verify signature and expiry and return the admin the token names.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedAdmin, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<AdminClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            }
        })?;

        Ok(data.claims.into())
    }
}
