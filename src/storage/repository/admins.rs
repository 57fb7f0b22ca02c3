// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin account repository.

use serde_json::{json, Value};

use super::{RepositoryError, RepositoryResult};
use crate::models::AdminRecord;
use crate::storage::{DataClient, Query, StoreError, ADMINS_TABLE};

/// Repository for admin accounts.
pub struct AdminRepository<'a> {
    client: &'a dyn DataClient,
}

impl<'a> AdminRepository<'a> {
    pub fn new(client: &'a dyn DataClient) -> Self {
        Self { client }
    }

    /// Look up an admin by exact username.
    pub async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<AdminRecord>> {
        let query = Query::new().eq("username", username);
        self.client
            .select_one(ADMINS_TABLE, &query)
            .await?
            .map(decode)
            .transpose()
    }

    /// Create an admin with an already-hashed password.
    pub async fn create(&self, username: &str, password_hash: &str) -> RepositoryResult<AdminRecord> {
        let row = json!({ "username": username, "password": password_hash });
        let stored = self
            .client
            .insert(ADMINS_TABLE, row)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { .. } => RepositoryError::Conflict {
                    field: "username",
                    message: "Username already exists",
                },
                other => RepositoryError::Store(other),
            })?;

        let admin = decode(stored)?;
        tracing::info!(admin_id = %admin.id, username = %admin.username, "Admin created");
        Ok(admin)
    }

    /// Replace the password hash of an existing admin.
    pub async fn set_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> RepositoryResult<AdminRecord> {
        let query = Query::new().eq("username", username);
        let admin = self
            .client
            .update(ADMINS_TABLE, &query, json!({ "password": password_hash }))
            .await?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound { resource: "Admin" })
            .and_then(decode)?;

        tracing::info!(admin_id = %admin.id, username = %admin.username, "Admin password updated");
        Ok(admin)
    }
}

fn decode(row: Value) -> RepositoryResult<AdminRecord> {
    serde_json::from_value(row).map_err(|e| RepositoryError::Decode {
        table: ADMINS_TABLE,
        reason: e.to_string(),
    })
}
