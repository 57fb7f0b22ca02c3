// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenKeys;
use crate::config::{Config, DEFAULT_JWT_EXPIRES_IN_SECS};
use crate::storage::{DataClient, InMemoryDataClient};
use crate::validation::ValidationPolicy;

/// Process-lifetime application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataClient>,
    pub tokens: TokenKeys,
    pub validation: ValidationPolicy,
    pub protect_member_routes: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn DataClient>, tokens: TokenKeys) -> Self {
        Self {
            store,
            tokens,
            validation: ValidationPolicy::server(),
            protect_member_routes: false,
        }
    }

    /// State for `config` backed by `store`.
    pub fn from_config(config: &Config, store: Arc<dyn DataClient>) -> Self {
        Self::new(
            store,
            TokenKeys::new(&config.jwt_secret, config.jwt_expires_in_secs),
        )
        .with_validation(ValidationPolicy {
            require_phone: config.require_phone,
        })
        .with_protected_member_routes(config.protect_member_routes)
    }

    /// Fresh in-memory store with the production unique constraints.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(InMemoryDataClient::with_default_schema()),
            TokenKeys::new(jwt_secret, DEFAULT_JWT_EXPIRES_IN_SECS),
        )
    }

    pub fn with_validation(mut self, policy: ValidationPolicy) -> Self {
        self.validation = policy;
        self
    }

    pub fn with_protected_member_routes(mut self, protect: bool) -> Self {
        self.protect_member_routes = protect;
        self
    }
}
