// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member Registry - Membership Registration Service
//!
//! A REST backend for a sports club's membership registrations. Members
//! register through a public form; admins log in to browse, search and
//! remove registrations. All data lives in a hosted relational store reached
//! over its PostgREST interface.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Admin login and session tokens (bcrypt, HS256 JWT)
//! - `client` - Typed HTTP client for the API
//! - `mapper` - External/internal member field mapping
//! - `storage` - Data store clients and repositories
//! - `validation` - Registration payload validation

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod mapper;
pub mod models;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod validation;
