// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! bcrypt password hashing.
//!
//! Hashing and verification are CPU-bound and run on the blocking pool.

use super::AuthError;

/// Work factor used for stored admin passwords.
pub const HASH_COST: u32 = 10;

/// Hash compared against when the username does not exist, so that unknown
/// users and wrong passwords take the same time to reject.
const DUMMY_HASH: &str = "$2a$10$N9qo8uLOickgx2ZMRZoMyeIjZAgcfl7p92ldGxad68LJZdL17lhWy";

/// Hash `password` with [`HASH_COST`].
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    hash_password_with_cost(password, HASH_COST).await
}

pub async fn hash_password_with_cost(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::InternalError(format!("hashing task failed: {e}")))?
        .map_err(|e| AuthError::InternalError(format!("failed to hash password: {e}")))
}

/// Check `password` against `hash`, or against a dummy hash when `hash` is
/// `None`. A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: Option<String>) -> Result<bool, AuthError> {
    let known = hash.is_some();
    let hash = hash.unwrap_or_else(|| DUMMY_HASH.to_string());

    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::InternalError(format!("verification task failed: {e}")))?
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Stored password hash could not be parsed");
            false
        });

    Ok(known && matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password_with_cost("s3cret!".into(), 4).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("s3cret!".into(), Some(hash.clone())).await.unwrap());
        assert!(!verify_password("wrong".into(), Some(hash)).await.unwrap());
    }

    #[tokio::test]
    async fn default_cost_is_ten() {
        let hash = hash_password("s3cret!".into()).await.unwrap();
        assert!(hash.contains("$10$"));
    }

    #[tokio::test]
    async fn unknown_user_never_matches() {
        assert!(!verify_password("anything".into(), None).await.unwrap());
    }

    #[tokio::test]
    async fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("x".into(), Some("plaintext".into())).await.unwrap());
    }
}
