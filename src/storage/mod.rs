// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Data Store Access
//!
//! The service keeps no data of its own. Every read and write is a direct
//! round trip to a hosted relational store through the [`DataClient`] trait.
//!
//! ## Implementations
//!
//! - [`PostgrestClient`]: the hosted store's PostgREST interface
//!   (`{base}/rest/v1/{table}`), authenticated with the project API key.
//! - [`InMemoryDataClient`]: process-local tables with the same uniqueness
//!   and identifier semantics, for tests and local development.
//!
//! ## Tables
//!
//! ```text
//! users   id (uuid, default), full_name, email (unique), phone, linkedin,
//!         referred_by, membership_type, sports (text[]), why_join,
//!         contribution, created_at (default now())
//! admins  id (uuid, default), username (unique), password, created_at
//! ```
//!
//! There is no caching, retrying or multi-statement transaction here:
//! uniqueness is enforced by the store and reported as
//! [`StoreError::UniqueViolation`].

pub mod memory;
pub mod postgrest;
pub mod repository;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::DataBackend;

pub use memory::InMemoryDataClient;
pub use postgrest::PostgrestClient;
pub use repository::{AdminRepository, MemberRepository, RepositoryError};

/// Table holding member registrations.
pub const MEMBERS_TABLE: &str = "users";

/// Table holding admin accounts.
pub const ADMINS_TABLE: &str = "admins";

/// Errors reported by a [`DataClient`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (`23505`).
    #[error("unique constraint violated: {message}")]
    UniqueViolation { message: String },

    /// The store could not interpret a value, e.g. a malformed uuid (`22P02`).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// The store answered with any other error.
    #[error("store rejected request ({status}): {message}")]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("unexpected response: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row predicate understood by every [`DataClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `column = value`.
    Eq { column: String, value: String },
    /// Any of `columns` contains `needle`, case-insensitively.
    ContainsAny { columns: Vec<String>, needle: String },
}

/// Table-scoped selection: all filters must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    pub fn contains_any<I, S>(mut self, columns: I, needle: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(Filter::ContainsAny {
            columns: columns.into_iter().map(Into::into).collect(),
            needle: needle.into(),
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Network client to the hosted relational store.
///
/// Rows travel as JSON objects. Writes return the affected rows as the store
/// represents them after the write, including generated columns.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value>;

    /// Select the rows matching `query`, in store order.
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Apply `changes` to every matching row and return the updated rows.
    async fn update(&self, table: &str, query: &Query, changes: Value) -> StoreResult<Vec<Value>>;

    /// Delete every matching row and return the deleted rows.
    async fn delete(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>>;

    /// Fetch at most one matching row.
    async fn select_one(&self, table: &str, query: &Query) -> StoreResult<Option<Value>> {
        let query = query.clone().limit(1);
        Ok(self.select(table, &query).await?.into_iter().next())
    }
}

/// Build the [`DataClient`] selected by `backend`.
pub fn connect(backend: &DataBackend) -> StoreResult<Arc<dyn DataClient>> {
    match backend {
        DataBackend::Postgrest { url, key } => {
            tracing::info!(url = %url, "Using PostgREST data store");
            Ok(Arc::new(PostgrestClient::new(url, key)?))
        }
        DataBackend::Memory => {
            tracing::warn!("Using in-memory data store; data is lost on restart");
            Ok(Arc::new(InMemoryDataClient::with_default_schema()))
        }
    }
}
