// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the data store.
//!
//! Each repository provides the operations for one table on top of a
//! [`DataClient`](super::DataClient), decoding rows into typed records and
//! translating store failures into domain outcomes.

pub mod admins;
pub mod members;

pub use admins::AdminRepository;
pub use members::MemberRepository;

use super::StoreError;

/// Domain-level outcome of a repository operation.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No row with the requested identifier.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// A unique field already holds the submitted value.
    #[error("{message}")]
    Conflict {
        field: &'static str,
        message: &'static str,
    },

    /// A row came back in a shape the repository cannot read.
    #[error("malformed {table} row: {reason}")]
    Decode { table: &'static str, reason: String },

    /// Any other store or transport failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
