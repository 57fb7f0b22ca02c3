// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! typed [`Config`] loaded from the environment at startup. A `.env` file in
//! the working directory is honoured when present.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SUPABASE_URL` | Base URL of the hosted data store | Required for `postgrest` |
//! | `SUPABASE_KEY` | API key of the hosted data store | Required for `postgrest` |
//! | `DATA_BACKEND` | `postgrest` or `memory` | `postgrest` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `FRONTEND_URL` | Allowed cross-origin value | `http://localhost:3000` |
//! | `JWT_SECRET` | HS256 secret for admin session tokens | Required |
//! | `JWT_EXPIRES_IN` | Session token lifetime in seconds | `3600` |
//! | `REQUIRE_PHONE` | Enforce the strict phone rule server-side | `false` |
//! | `PROTECT_MEMBER_ROUTES` | Require an admin token on `/users` routes | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_KEY";
pub const DATA_BACKEND_ENV: &str = "DATA_BACKEND";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const FRONTEND_URL_ENV: &str = "FRONTEND_URL";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_EXPIRES_IN_ENV: &str = "JWT_EXPIRES_IN";
pub const REQUIRE_PHONE_ENV: &str = "REQUIRE_PHONE";
pub const PROTECT_MEMBER_ROUTES_ENV: &str = "PROTECT_MEMBER_ROUTES";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Base URL of a running API, read by the client module.
pub const API_URL_ENV: &str = "API_URL";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_JWT_EXPIRES_IN_SECS: u64 = 3600;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which [`DataClient`](crate::storage::DataClient) implementation backs the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataBackend {
    /// Hosted store reached over its PostgREST interface.
    Postgrest { url: String, key: String },
    /// Process-local tables; contents are lost on restart.
    Memory,
}

impl DataBackend {
    /// Read only the store selection, for tools that need no other settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        match get(DATA_BACKEND_ENV).as_deref().map(str::to_ascii_lowercase) {
            None => postgrest_backend(&get),
            Some(kind) if kind == "postgrest" => postgrest_backend(&get),
            Some(kind) if kind == "memory" => Ok(DataBackend::Memory),
            Some(other) => Err(ConfigError::Invalid {
                name: DATA_BACKEND_ENV,
                reason: format!("unknown backend '{other}' (expected postgrest or memory)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// `json` (any case) selects JSON; anything else is pretty.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        Self::parse(env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: DataBackend,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_secs: u64,
    pub require_phone: bool,
    pub protect_member_routes: bool,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = DataBackend::from_lookup(&lookup)?;

        let port = match get(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("'{raw}' is not a valid port"),
            })?,
            None => DEFAULT_PORT,
        };

        let jwt_expires_in_secs = match get(JWT_EXPIRES_IN_ENV) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: JWT_EXPIRES_IN_ENV,
                        reason: format!("'{raw}' is not a positive number of seconds"),
                    })
                }
            },
            None => DEFAULT_JWT_EXPIRES_IN_SECS,
        };

        let log_format = LogFormat::parse(get(LOG_FORMAT_ENV).as_deref());

        Ok(Self {
            backend,
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            frontend_url: get(FRONTEND_URL_ENV).unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string()),
            jwt_secret: get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?,
            jwt_expires_in_secs,
            require_phone: parse_flag(&get, REQUIRE_PHONE_ENV)?,
            protect_member_routes: parse_flag(&get, PROTECT_MEMBER_ROUTES_ENV)?,
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn postgrest_backend<G>(get: &G) -> Result<DataBackend, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let url = get(SUPABASE_URL_ENV).ok_or(ConfigError::Missing(SUPABASE_URL_ENV))?;
    let key = get(SUPABASE_KEY_ENV).ok_or(ConfigError::Missing(SUPABASE_KEY_ENV))?;
    url::Url::parse(&url).map_err(|e| ConfigError::Invalid {
        name: SUPABASE_URL_ENV,
        reason: e.to_string(),
    })?;
    Ok(DataBackend::Postgrest { url, key })
}

fn parse_flag<G>(get: &G, name: &'static str) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name).as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(ConfigError::Invalid {
            name,
            reason: format!("'{other}' is not a boolean"),
        }),
    }
}
