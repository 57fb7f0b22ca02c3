// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated admins.
//!
//! Use the `AdminAuth` extractor in handlers to require a session token:
//!
//! ```rust,ignore
//! async fn my_handler(AdminAuth(admin): AdminAuth) -> impl IntoResponse {
//!     // admin is AuthenticatedAdmin
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, AuthenticatedAdmin};
use crate::state::AppState;

/// Extractor for authenticated admins.
///
/// Validates the HS256 session token from the `Authorization: Bearer` header.
/// If [`require_admin`](super::middleware::require_admin) already ran for
/// the request, its result is reused.
pub struct AdminAuth(pub AuthenticatedAdmin);

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(admin) = parts.extensions.get::<AuthenticatedAdmin>().cloned() {
            return Ok(AdminAuth(admin));
        }

        let token = bearer_token(&parts.headers)?;
        let admin = state.tokens.verify(token)?;
        Ok(AdminAuth(admin))
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/auth/me");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn admin() -> AuthenticatedAdmin {
        AuthenticatedAdmin {
            admin_id: "a1".into(),
            username: "superadmin".into(),
        }
    }

    #[tokio::test]
    async fn requires_auth_header() {
        let state = AppState::in_memory("test-secret");
        let result = AdminAuth::from_request_parts(&mut parts(None), &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn rejects_non_bearer_scheme() {
        let state = AppState::in_memory("test-secret");
        let result =
            AdminAuth::from_request_parts(&mut parts(Some("Basic dXNlcjpwYXNz")), &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let state = AppState::in_memory("test-secret");
        let token = state.tokens.issue(&admin()).unwrap();

        let AdminAuth(found) =
            AdminAuth::from_request_parts(&mut parts(Some(&format!("Bearer {token}"))), &state)
                .await
                .unwrap();
        assert_eq!(found, admin());
    }

    #[tokio::test]
    async fn prefers_extensions() {
        let state = AppState::in_memory("test-secret");
        let mut parts = parts(None);
        parts.extensions.insert(admin());

        let AdminAuth(found) = AdminAuth::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert_eq!(found.username, "superadmin");
    }
}
