// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member repository.
//!
//! Registrations live in the `users` table. Email uniqueness is enforced by
//! the store's constraint and surfaced here as a conflict; nothing checks for
//! an existing email before inserting.

use serde_json::Value;

use super::{RepositoryError, RepositoryResult};
use crate::mapper;
use crate::models::{Member, MemberRecord, NewMember};
use crate::storage::{DataClient, Query, StoreError, MEMBERS_TABLE};

/// Columns the list search matches against.
const SEARCH_COLUMNS: [&str; 2] = ["full_name", "email"];

/// Repository for member operations on the data store.
pub struct MemberRepository<'a> {
    client: &'a dyn DataClient,
}

impl<'a> MemberRepository<'a> {
    pub fn new(client: &'a dyn DataClient) -> Self {
        Self { client }
    }

    /// Persist a validated registration.
    ///
    /// Returns the stored member with its assigned identifier and timestamp,
    /// or [`RepositoryError::Conflict`] when the email is already registered.
    pub async fn create(&self, member: &NewMember) -> RepositoryResult<Member> {
        let row = serde_json::to_value(mapper::to_record(member)).map_err(|e| {
            RepositoryError::Decode {
                table: MEMBERS_TABLE,
                reason: e.to_string(),
            }
        })?;

        let stored = self
            .client
            .insert(MEMBERS_TABLE, row)
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation { .. } => RepositoryError::Conflict {
                    field: "email",
                    message: "Email already exists",
                },
                other => RepositoryError::Store(other),
            })?;

        let member = decode(stored)?;
        tracing::info!(member_id = %member.id, "Member registered");
        Ok(member)
    }

    /// List members, optionally keeping only those whose name or email
    /// contains `search` (case-insensitive). Order is whatever the store
    /// returns.
    ///
    /// Rows that do not decode (a tier or sport this service does not know,
    /// say) are logged and left out rather than failing the whole listing.
    pub async fn list(&self, search: Option<&str>) -> RepositoryResult<Vec<Member>> {
        let query = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => Query::new().contains_any(SEARCH_COLUMNS, needle),
            None => Query::new(),
        };

        let rows = self.client.select(MEMBERS_TABLE, &query).await?;
        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.get("id").and_then(Value::as_str).map(str::to_owned);
            match decode(row) {
                Ok(member) => members.push(member),
                Err(e) => {
                    tracing::warn!(member_id = ?id, error = %e, "Skipping undecodable member row")
                }
            }
        }
        Ok(members)
    }

    /// Get a member by identifier.
    pub async fn get(&self, id: &str) -> RepositoryResult<Member> {
        let row = self
            .client
            .select_one(MEMBERS_TABLE, &by_id(id))
            .await
            .map_err(not_found_on_invalid_id)?
            .ok_or(RepositoryError::NotFound { resource: "User" })?;
        decode(row)
    }

    /// Delete a member by identifier and return what was removed.
    pub async fn delete(&self, id: &str) -> RepositoryResult<Member> {
        let row = self
            .client
            .delete(MEMBERS_TABLE, &by_id(id))
            .await
            .map_err(not_found_on_invalid_id)?
            .into_iter()
            .next()
            .ok_or(RepositoryError::NotFound { resource: "User" })?;

        let member = decode(row)?;
        tracing::info!(member_id = %member.id, "Member deleted");
        Ok(member)
    }
}

fn by_id(id: &str) -> Query {
    Query::new().eq("id", id)
}

/// An identifier the store cannot even parse names no row.
fn not_found_on_invalid_id(error: StoreError) -> RepositoryError {
    match error {
        StoreError::InvalidInput { .. } => RepositoryError::NotFound { resource: "User" },
        other => RepositoryError::Store(other),
    }
}

fn decode(row: Value) -> RepositoryResult<Member> {
    let record: MemberRecord =
        serde_json::from_value(row).map_err(|e| RepositoryError::Decode {
            table: MEMBERS_TABLE,
            reason: e.to_string(),
        })?;
    Ok(mapper::from_record(record))
}
