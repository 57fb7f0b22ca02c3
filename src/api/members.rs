// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::{
    error::{ApiError, ErrorBody},
    mapper,
    models::{CreateMemberRequest, MemberRecord, MemberSearchQuery},
    state::AppState,
    storage::MemberRepository,
    validation::validate_new_member,
};

#[utoipa::path(
    post,
    path = "/users/register",
    request_body = CreateMemberRequest,
    tag = "Members",
    responses(
        (status = 201, description = "Member registered", body = MemberRecord),
        (status = 400, description = "Payload failed validation", body = ErrorBody),
        (status = 409, description = "Email already exists", body = ErrorBody)
    )
)]
pub async fn register_member(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MemberRecord>), ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let member = validate_new_member(&payload, state.validation)?;

    let created = MemberRepository::new(state.store.as_ref())
        .create(&member)
        .await?;
    Ok((StatusCode::CREATED, Json(mapper::member_to_record(&created))))
}

#[utoipa::path(
    get,
    path = "/users",
    params(MemberSearchQuery),
    tag = "Members",
    responses((status = 200, body = [MemberRecord]))
)]
pub async fn list_members(
    State(state): State<AppState>,
    Query(params): Query<MemberSearchQuery>,
) -> Result<Json<Vec<MemberRecord>>, ApiError> {
    let members = MemberRepository::new(state.store.as_ref())
        .list(params.search.as_deref())
        .await?;
    Ok(Json(members.iter().map(mapper::member_to_record).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "Identifier of the member")
    ),
    tag = "Members",
    responses(
        (status = 200, body = MemberRecord),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_member(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MemberRecord>, ApiError> {
    let member = MemberRepository::new(state.store.as_ref()).get(&id).await?;
    Ok(Json(mapper::member_to_record(&member)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(
        ("id" = String, Path, description = "Identifier of the member to delete")
    ),
    tag = "Members",
    responses(
        (status = 200, description = "The deleted member", body = MemberRecord),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn delete_member(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MemberRecord>, ApiError> {
    let member = MemberRepository::new(state.store.as_ref())
        .delete(&id)
        .await?;
    Ok(Json(mapper::member_to_record(&member)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MembershipType, Sport};
    use crate::storage::InMemoryDataClient;
    use crate::validation::ValidationPolicy;
    use serde_json::json;
    use std::sync::Arc;

    fn jane() -> Value {
        json!({
            "full_name": "Jane Doe",
            "email": "jane@x.com",
            "membership_type": "Basic",
            "sports": ["Tennis", "Padel"]
        })
    }

    async fn register(state: &AppState, payload: Value) -> Result<MemberRecord, ApiError> {
        register_member(State(state.clone()), Ok(Json(payload)))
            .await
            .map(|(status, Json(record))| {
                assert_eq!(status, StatusCode::CREATED);
                record
            })
    }

    #[tokio::test]
    async fn register_member_success() {
        let state = AppState::in_memory("test-secret");

        let record = register(&state, jane()).await.expect("registration succeeds");

        assert!(record.id.is_some());
        assert!(record.created_at.is_some());
        assert_eq!(record.full_name, "Jane Doe");
        assert_eq!(record.email.as_deref(), Some("jane@x.com"));
        assert_eq!(record.membership_type, MembershipType::Basic);
        assert_eq!(record.sports, Some(vec![Sport::Tennis, Sport::Padel]));
        assert_eq!(record.phone, None);
    }

    #[tokio::test]
    async fn duplicate_email_any_case_conflicts() {
        let state = AppState::in_memory("test-secret");
        register(&state, jane()).await.unwrap();

        let mut shouting = jane();
        shouting["email"] = json!("JANE@X.COM");
        let err = register(&state, shouting).await.unwrap_err();

        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "Email already exists");
    }

    #[tokio::test]
    async fn invalid_payload_never_reaches_store() {
        let store = Arc::new(InMemoryDataClient::with_default_schema());
        let state = AppState::new(store.clone(), crate::auth::TokenKeys::new("s", 60));

        let err = register(&state, json!({ "full_name": "No Email" }))
            .await
            .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Email is required");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn strict_phone_policy_applies_when_configured() {
        let state =
            AppState::in_memory("test-secret").with_validation(ValidationPolicy { require_phone: true });

        let err = register(&state, jane()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.details.iter().any(|d| d.field == "phone"));
    }

    #[tokio::test]
    async fn list_get_and_delete() {
        let state = AppState::in_memory("test-secret");
        let jane = register(&state, jane()).await.unwrap();
        register(
            &state,
            json!({ "full_name": "Tom Lee", "email": "tom@y.com" }),
        )
        .await
        .unwrap();

        let Json(all) = list_members(State(state.clone()), Query(MemberSearchQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let Json(found) = list_members(
            State(state.clone()),
            Query(MemberSearchQuery {
                search: Some("jane".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(found, vec![jane.clone()]);

        let id = jane.id.clone().unwrap();
        let Json(fetched) = get_member(Path(id.clone()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(fetched, jane);

        let Json(deleted) = delete_member(Path(id.clone()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(deleted, jane);

        let err = delete_member(Path(id.clone()), State(state.clone()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "User not found");
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let state = AppState::in_memory("test-secret");
        let err = get_member(Path("abc".into()), State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
