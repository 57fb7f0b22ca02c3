// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed HTTP client for the member registry API.
//!
//! Mirrors what the registration frontend does: registrations are checked
//! with [`ValidationPolicy::client`] before anything is sent, responses are
//! converted to the internal [`Member`] shape, and failures are reduced to a
//! single human-readable message.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::AuthenticatedAdmin;
use crate::config::API_URL_ENV;
use crate::mapper;
use crate::models::{CreateMemberRequest, LoginRequest, LoginResponse, Member, MemberRecord};
use crate::validation::{validate_new_member, ValidationErrors, ValidationPolicy};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("invalid API URL: {0}")]
    InvalidUrl(String),

    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url,
            http,
            token: None,
        })
    }

    /// Client for the API named by `API_URL`.
    pub fn from_env() -> ClientResult<Self> {
        let base = std::env::var(API_URL_ENV)
            .map_err(|_| ClientError::InvalidUrl(format!("{API_URL_ENV} is not set")))?;
        Self::new(&base)
    }

    /// Send `token` as a bearer credential on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Validate and submit a registration.
    pub async fn register(&self, request: &CreateMemberRequest) -> ClientResult<Member> {
        let payload = serde_json::to_value(request)?;
        validate_new_member(&payload, ValidationPolicy::client()).map_err(ClientError::Validation)?;

        let record: MemberRecord = self
            .send(self.http.post(self.url("users/register")?).json(&payload))
            .await?;
        Ok(mapper::from_record(record))
    }

    pub async fn list_members(&self, search: Option<&str>) -> ClientResult<Vec<Member>> {
        let mut request = self.http.get(self.url("users")?);
        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            request = request.query(&[("search", search)]);
        }
        let records: Vec<MemberRecord> = self.send(request).await?;
        Ok(records.into_iter().map(mapper::from_record).collect())
    }

    pub async fn get_member(&self, id: &str) -> ClientResult<Member> {
        let record: MemberRecord = self.send(self.http.get(self.member_url(id)?)).await?;
        Ok(mapper::from_record(record))
    }

    pub async fn delete_member(&self, id: &str) -> ClientResult<Member> {
        let record: MemberRecord = self.send(self.http.delete(self.member_url(id)?)).await?;
        Ok(mapper::from_record(record))
    }

    /// Log in and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<String> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self
            .send(self.http.post(self.url("auth/login")?).json(&request))
            .await?;
        Ok(response.access_token)
    }

    pub async fn me(&self) -> ClientResult<AuthenticatedAdmin> {
        self.send(self.http.get(self.url("auth/me")?)).await
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))
    }

    fn member_url(&self, id: &str) -> ClientResult<Url> {
        let mut url = self.url("users")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl("base URL cannot have a path".to_string()))?
            .push(id);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response.json().await?);
        }
        Err(api_error(response).await)
    }
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    tracing::debug!(status = status.as_u16(), %message, "API request failed");
    ClientError::Api { status, message }
}

/// One line describing a failed response.
///
/// Prefers `message` (joined when it is a list), then `error`, then the raw
/// body, then the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<Value>(body) {
        let from_message = match parsed.get("message") {
            Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
            Some(Value::Array(parts)) => {
                let joined = parts
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        };
        let from_error = parsed
            .get("error")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        if let Some(message) = from_message.or(from_error) {
            return message;
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}
