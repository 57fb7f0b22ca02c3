// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::{
    auth::{middleware::require_admin, AuthenticatedAdmin},
    error::ErrorBody,
    models::{
        CreateMemberRequest, LoginRequest, LoginResponse, MemberRecord, MembershipType, Sport,
    },
    state::AppState,
    validation::FieldError,
};

pub mod auth;
pub mod health;
pub mod members;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates a uuid v4 for every request lacking an `x-request-id`.
#[derive(Clone, Copy)]
struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

pub fn router(state: AppState, frontend_url: &str) -> Router {
    let mut member_routes = Router::new()
        .route("/users/register", post(members::register_member))
        .route("/users", get(members::list_members))
        .route(
            "/users/{id}",
            get(members::get_member).delete(members::delete_member),
        );

    if state.protect_member_routes {
        member_routes = member_routes.route_layer(from_fn_with_state(state.clone(), require_admin));
    }

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(member_routes)
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(cors_layer(frontend_url))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, UuidRequestId))
}

/// CORS for the single frontend origin, with credentials.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url.trim_end_matches('/')) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "Ignoring unusable frontend origin");
            cors
        }
    }
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        members::register_member,
        members::list_members,
        members::get_member,
        members::delete_member,
        auth::login,
        auth::me,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            CreateMemberRequest,
            MemberRecord,
            MembershipType,
            Sport,
            LoginRequest,
            LoginResponse,
            AuthenticatedAdmin,
            ErrorBody,
            FieldError,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Members", description = "Member registration and lookup"),
        (name = "Auth", description = "Admin sessions"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
