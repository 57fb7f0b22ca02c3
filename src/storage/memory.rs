// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory [`DataClient`] for tests and local development.
//!
//! Mirrors the hosted store closely enough that the repositories cannot tell
//! the difference: generated `id` (uuid v4) and `created_at` columns, unique
//! constraints that reject writes, and `22P02`-style rejection of malformed
//! uuids in `id` filters. Rows are kept in insertion order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DataClient, Filter, Query, StoreError, StoreResult, ADMINS_TABLE, MEMBERS_TABLE};

type Row = Map<String, Value>;

#[derive(Default)]
pub struct InMemoryDataClient {
    tables: RwLock<HashMap<String, Vec<Row>>>,
    unique: HashMap<String, Vec<String>>,
    calls: AtomicUsize,
}

impl InMemoryDataClient {
    /// Empty store with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store with the production unique constraints
    /// (`users.email`, `admins.username`).
    pub fn with_default_schema() -> Self {
        Self::new()
            .with_unique(MEMBERS_TABLE, "email")
            .with_unique(ADMINS_TABLE, "username")
    }

    /// Add a unique constraint on `table.column`.
    pub fn with_unique(mut self, table: &str, column: &str) -> Self {
        self.unique
            .entry(table.to_string())
            .or_default()
            .push(column.to_string());
        self
    }

    /// Number of operations served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of rows currently in `table`.
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, Vec::len)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Reject `candidate` if it collides with any row in `rows` other than
    /// the one at `skip`.
    fn check_unique(
        &self,
        table: &str,
        rows: &[Row],
        candidate: &Row,
        skip: Option<usize>,
    ) -> StoreResult<()> {
        let Some(columns) = self.unique.get(table) else {
            return Ok(());
        };

        for column in columns {
            let Some(value) = candidate.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            let taken = rows
                .iter()
                .enumerate()
                .filter(|(i, _)| Some(*i) != skip)
                .any(|(_, row)| row.get(column) == Some(value));
            if taken {
                return Err(StoreError::UniqueViolation {
                    message: format!("Key ({column})=({}) already exists.", display(value)),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DataClient for InMemoryDataClient {
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        self.record_call();
        let Value::Object(mut row) = row else {
            return Err(StoreError::InvalidInput {
                message: "row must be a JSON object".to_string(),
            });
        };

        if row.get("id").map_or(true, Value::is_null) {
            row.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }
        if row.get("created_at").map_or(true, Value::is_null) {
            row.insert(
                "created_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        self.check_unique(table, rows, &row, None)?;
        rows.push(row.clone());
        Ok(Value::Object(row))
    }

    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        self.record_call();
        check_filters(query)?;

        let tables = self.tables.read().await;
        let rows = tables.get(table).map(Vec::as_slice).unwrap_or_default();
        let matching = rows.iter().filter(|row| matches_query(row, query)).cloned();

        Ok(match query.limit {
            Some(limit) => matching.take(limit).map(Value::Object).collect(),
            None => matching.map(Value::Object).collect(),
        })
    }

    async fn update(&self, table: &str, query: &Query, changes: Value) -> StoreResult<Vec<Value>> {
        self.record_call();
        check_filters(query)?;
        let Value::Object(changes) = changes else {
            return Err(StoreError::InvalidInput {
                message: "changes must be a JSON object".to_string(),
            });
        };

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| matches_query(row, query))
            .map(|(i, _)| i)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();

        let mut updated = Vec::with_capacity(targets.len());
        for index in targets {
            let mut candidate = rows[index].clone();
            for (key, value) in &changes {
                candidate.insert(key.clone(), value.clone());
            }
            self.check_unique(table, rows, &candidate, Some(index))?;
            rows[index] = candidate.clone();
            updated.push(Value::Object(candidate));
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        self.record_call();
        check_filters(query)?;

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let mut deleted = Vec::new();
        rows.retain(|row| {
            if matches_query(row, query) {
                deleted.push(Value::Object(row.clone()));
                false
            } else {
                true
            }
        });
        Ok(deleted)
    }
}

/// `id` columns are uuids in the hosted store; reject what it would reject.
fn check_filters(query: &Query) -> StoreResult<()> {
    for filter in &query.filters {
        if let Filter::Eq { column, value } = filter {
            if column == "id" && Uuid::parse_str(value).is_err() {
                return Err(StoreError::InvalidInput {
                    message: format!("invalid input syntax for type uuid: \"{value}\""),
                });
            }
        }
    }
    Ok(())
}

fn matches_query(row: &Row, query: &Query) -> bool {
    query.filters.iter().all(|filter| match filter {
        Filter::Eq { column, value } => row.get(column).is_some_and(|v| display(v) == *value),
        Filter::ContainsAny { columns, needle } => {
            let needle = needle.to_lowercase();
            columns.iter().any(|column| {
                row.get(column)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v.to_lowercase().contains(&needle))
            })
        }
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
