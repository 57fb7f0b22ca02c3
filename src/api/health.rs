// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;
use crate::storage::{Query, MEMBERS_TABLE};

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Whether the data store answers a trivial query.
    pub store: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

async fn check_store(state: &AppState) -> String {
    match state.store.select_one(MEMBERS_TABLE, &Query::new()).await {
        Ok(_) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Data store health check failed");
            "unavailable".to_string()
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 if all checks pass, 503 if any check fails.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let store = check_store(&state).await;
    let all_ok = store == "ok";

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            store,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if the data store is reachable.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenKeys;
    use crate::storage::{DataClient, StoreError, StoreResult};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl DataClient for Unreachable {
        async fn insert(&self, _: &str, _: Value) -> StoreResult<Value> {
            Err(StoreError::Transport("down".into()))
        }
        async fn select(&self, _: &str, _: &Query) -> StoreResult<Vec<Value>> {
            Err(StoreError::Transport("down".into()))
        }
        async fn update(&self, _: &str, _: &Query, _: Value) -> StoreResult<Vec<Value>> {
            Err(StoreError::Transport("down".into()))
        }
        async fn delete(&self, _: &str, _: &Query) -> StoreResult<Vec<Value>> {
            Err(StoreError::Transport("down".into()))
        }
    }

    #[tokio::test]
    async fn healthy_with_reachable_store() {
        let (status, Json(body)) = health(State(AppState::in_memory("s"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.checks.store, "ok");
    }

    #[tokio::test]
    async fn degraded_without_store() {
        let state = AppState::new(Arc::new(Unreachable), TokenKeys::new("s", 60));
        let (status, Json(body)) = readiness(State(state)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
        assert_eq!(body.checks.store, "unavailable");
    }

    #[tokio::test]
    async fn liveness_always_ok() {
        let Json(body) = liveness().await;
        assert_eq!(body.status, "ok");
    }
}
