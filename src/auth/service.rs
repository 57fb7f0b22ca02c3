// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin login and provisioning.

use super::{password, AuthError, AuthenticatedAdmin, TokenKeys};
use crate::models::{LoginRequest, LoginResponse};
use crate::storage::{AdminRepository, DataClient, RepositoryError};

/// What [`provision_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    PasswordUpdated,
}

/// Verify admin credentials and issue a session token.
///
/// Unknown usernames and wrong passwords both yield
/// [`AuthError::InvalidCredentials`], after the same amount of bcrypt work.
pub async fn login(
    client: &dyn DataClient,
    keys: &TokenKeys,
    request: &LoginRequest,
) -> Result<LoginResponse, AuthError> {
    let admin = AdminRepository::new(client)
        .find_by_username(&request.username)
        .await
        .map_err(internal)?;

    let stored_hash = admin.as_ref().map(|a| a.password_hash.clone());
    let matched = password::verify_password(request.password.clone(), stored_hash).await?;

    let Some(admin) = admin.filter(|_| matched) else {
        tracing::warn!(username = %request.username, "Admin login rejected");
        return Err(AuthError::InvalidCredentials);
    };

    let access_token = keys.issue(&AuthenticatedAdmin {
        admin_id: admin.id.clone(),
        username: admin.username.clone(),
    })?;

    tracing::info!(admin_id = %admin.id, username = %admin.username, "Admin logged in");
    Ok(LoginResponse { access_token })
}

/// Create the admin `username`, or reset its password if it already exists.
pub async fn provision_admin(
    client: &dyn DataClient,
    username: &str,
    password: &str,
) -> Result<ProvisionOutcome, AuthError> {
    let hash = password::hash_password(password.to_string()).await?;
    let repo = AdminRepository::new(client);

    if repo.find_by_username(username).await.map_err(internal)?.is_some() {
        repo.set_password(username, &hash).await.map_err(internal)?;
        return Ok(ProvisionOutcome::PasswordUpdated);
    }

    match repo.create(username, &hash).await {
        Ok(_) => Ok(ProvisionOutcome::Created),
        // Created concurrently between the lookup and the insert.
        Err(RepositoryError::Conflict { .. }) => {
            repo.set_password(username, &hash).await.map_err(internal)?;
            Ok(ProvisionOutcome::PasswordUpdated)
        }
        Err(e) => Err(internal(e)),
    }
}

fn internal(error: RepositoryError) -> AuthError {
    AuthError::InternalError(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDataClient;

    fn request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn provisioned_admin_can_log_in() {
        let store = InMemoryDataClient::with_default_schema();
        let keys = TokenKeys::new("test-secret", 3600);

        let outcome = provision_admin(&store, "superadmin", "hunter22").await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::Created);

        let response = login(&store, &keys, &request("superadmin", "hunter22"))
            .await
            .unwrap();
        let admin = keys.verify(&response.access_token).unwrap();
        assert_eq!(admin.username, "superadmin");
        assert!(!admin.admin_id.is_empty());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let store = InMemoryDataClient::with_default_schema();
        let keys = TokenKeys::new("test-secret", 3600);
        provision_admin(&store, "superadmin", "hunter22").await.unwrap();

        let wrong = login(&store, &keys, &request("superadmin", "nope"))
            .await
            .unwrap_err();
        let unknown = login(&store, &keys, &request("ghost", "hunter22"))
            .await
            .unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn reprovisioning_replaces_password() {
        let store = InMemoryDataClient::with_default_schema();
        let keys = TokenKeys::new("test-secret", 3600);
        provision_admin(&store, "superadmin", "first").await.unwrap();

        let outcome = provision_admin(&store, "superadmin", "second").await.unwrap();
        assert_eq!(outcome, ProvisionOutcome::PasswordUpdated);
        assert_eq!(store.row_count(crate::storage::ADMINS_TABLE).await, 1);

        assert!(login(&store, &keys, &request("superadmin", "first")).await.is_err());
        assert!(login(&store, &keys, &request("superadmin", "second")).await.is_ok());
    }
}
