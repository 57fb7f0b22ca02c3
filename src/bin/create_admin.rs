// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Provision an admin account.
//!
//! Reads `ADMIN_USERNAME` (default `superadmin`) and `ADMIN_PASSWORD`, then
//! creates the admin or resets the password of an existing one.

use member_registry::{
    auth::{provision_admin, ProvisionOutcome},
    config::{DataBackend, LogFormat},
    storage, telemetry,
};

const ADMIN_USERNAME_ENV: &str = "ADMIN_USERNAME";
const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
const DEFAULT_ADMIN_USERNAME: &str = "superadmin";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing(LogFormat::from_env());

    let username = std::env::var(ADMIN_USERNAME_ENV)
        .ok()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());
    let password = std::env::var(ADMIN_PASSWORD_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| format!("{ADMIN_PASSWORD_ENV} must be set"))?;

    let backend = DataBackend::from_env()?;
    if backend == DataBackend::Memory {
        tracing::warn!("In-memory backend selected; the admin will not outlive this process");
    }
    let store = storage::connect(&backend)?;

    match provision_admin(store.as_ref(), &username, &password).await? {
        ProvisionOutcome::Created => tracing::info!(%username, "Admin created"),
        ProvisionOutcome::PasswordUpdated => {
            tracing::info!(%username, "Admin already existed; password updated")
        }
    }
    Ok(())
}
