// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for router subtrees.
//!
//! Applied to the member routes when `PROTECT_MEMBER_ROUTES` is enabled:
//!
//! ```rust,ignore
//! let users = users.route_layer(axum::middleware::from_fn_with_state(
//!     state.clone(),
//!     require_admin,
//! ));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::bearer_token;
use crate::state::AppState;

/// Reject requests without a valid admin session token.
///
/// On success the [`AuthenticatedAdmin`](super::AuthenticatedAdmin) is stored
/// in the request extensions for downstream extractors.
pub async fn require_admin(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let verified = bearer_token(request.headers()).and_then(|token| state.tokens.verify(token));

    match verified {
        Ok(admin) => {
            tracing::debug!(admin_id = %admin.admin_id, "Admin authenticated");
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
