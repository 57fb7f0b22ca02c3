// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::{
    auth::{self, AdminAuth, AuthenticatedAdmin},
    error::{ApiError, ErrorBody},
    models::{LoginRequest, LoginResponse},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    request: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let response = auth::login(state.store.as_ref(), &state.tokens, &request).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The authenticated admin", body = AuthenticatedAdmin),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    )
)]
pub async fn me(AdminAuth(admin): AdminAuth) -> Json<AuthenticatedAdmin> {
    Json(admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let state = AppState::in_memory("test-secret");
        auth::provision_admin(state.store.as_ref(), "superadmin", "hunter22")
            .await
            .unwrap();

        let Json(response) = login(
            State(state.clone()),
            Ok(Json(LoginRequest {
                username: "superadmin".into(),
                password: "hunter22".into(),
            })),
        )
        .await
        .unwrap();

        let admin = state.tokens.verify(&response.access_token).unwrap();
        assert_eq!(admin.username, "superadmin");
    }

    #[tokio::test]
    async fn login_rejects_unknown_admin() {
        let state = AppState::in_memory("test-secret");
        let err = login(
            State(state),
            Ok(Json(LoginRequest {
                username: "ghost".into(),
                password: "x".into(),
            })),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "Invalid credentials");
    }
}
