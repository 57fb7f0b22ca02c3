// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! PostgREST client for the hosted data store.
//!
//! Requests go to `{base}/rest/v1/{table}` with the project key in both the
//! `apikey` and `Authorization: Bearer` headers. Writes ask for
//! `Prefer: return=representation` so generated columns (`id`,
//! `created_at`) come back in the response.
//!
//! Error bodies look like:
//!
//! ```json
//! {"code":"23505","message":"duplicate key value violates unique constraint \"users_email_key\"",
//!  "details":"Key (email)=(jane@x.com) already exists.","hint":null}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, RequestBuilder,
};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::{DataClient, Filter, Query, StoreError, StoreResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const REST_PATH: &str = "rest/v1";

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres SQLSTATE for invalid_text_representation.
const INVALID_TEXT_REPRESENTATION: &str = "22P02";

#[derive(Debug, Deserialize, Default)]
struct PostgrestErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostgrestClient {
    rest_url: Url,
    http: Client,
}

impl PostgrestClient {
    /// Create a client for the project at `base_url` using `api_key`.
    pub fn new(base_url: &str, api_key: &str) -> StoreResult<Self> {
        let rest_url = rest_url(base_url)?;

        let key = HeaderValue::from_str(api_key)
            .map_err(|e| StoreError::Transport(format!("invalid API key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| StoreError::Transport(format!("invalid API key: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { rest_url, http })
    }

    fn table_url(&self, table: &str) -> StoreResult<Url> {
        self.rest_url
            .join(table)
            .map_err(|e| StoreError::Transport(format!("invalid table '{table}': {e}")))
    }

    async fn send(&self, table: &str, request: RequestBuilder) -> StoreResult<Vec<Value>> {
        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !status.is_success() {
            let error = decode_error(status.as_u16(), &body);
            tracing::debug!(table, status = status.as_u16(), error = %error, "Store request failed");
            return Err(error);
        }

        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&body).map_err(|e| StoreError::Decode(e.to_string()))? {
            Value::Array(rows) => Ok(rows),
            row @ Value::Object(_) => Ok(vec![row]),
            other => Err(StoreError::Decode(format!("expected rows, got {other}"))),
        }
    }
}

#[async_trait]
impl DataClient for PostgrestClient {
    async fn insert(&self, table: &str, row: Value) -> StoreResult<Value> {
        let request = self
            .http
            .post(self.table_url(table)?)
            .header("Prefer", "return=representation")
            .json(&row);

        self.send(table, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(query_params(query));

        let request = self.http.get(self.table_url(table)?).query(&params);
        self.send(table, request).await
    }

    async fn update(&self, table: &str, query: &Query, changes: Value) -> StoreResult<Vec<Value>> {
        let request = self
            .http
            .patch(self.table_url(table)?)
            .query(&query_params(query))
            .header("Prefer", "return=representation")
            .json(&changes);
        self.send(table, request).await
    }

    async fn delete(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let request = self
            .http
            .delete(self.table_url(table)?)
            .query(&query_params(query))
            .header("Prefer", "return=representation");
        self.send(table, request).await
    }
}

/// `{base}/rest/v1/` with a trailing slash so table names join underneath.
fn rest_url(base_url: &str) -> StoreResult<Url> {
    let joined = format!("{}/{REST_PATH}/", base_url.trim_end_matches('/'));
    Url::parse(&joined).map_err(|e| StoreError::Transport(format!("invalid store URL: {e}")))
}

/// Encode a [`Query`] as PostgREST query parameters.
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = Vec::with_capacity(query.filters.len() + 1);

    for filter in &query.filters {
        match filter {
            // Everything after `eq.` is taken literally by PostgREST.
            Filter::Eq { column, value } => params.push((column.clone(), format!("eq.{value}"))),
            Filter::ContainsAny { columns, needle } => {
                // `ilike` turns every `*` into a wildcard, so match with an
                // escaped case-insensitive regex instead.
                let pattern = escape_regex(needle);
                let conditions = columns
                    .iter()
                    .map(|column| format!("{column}.imatch.{}", quote(&pattern)))
                    .collect::<Vec<_>>()
                    .join(",");
                params.push(("or".to_string(), format!("({conditions})")));
            }
        }
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

/// Escape POSIX regex metacharacters so the needle matches literally.
///
/// A backslash before any non-alphanumeric character is a literal in
/// Postgres regexes, so all ASCII punctuation is escaped.
fn escape_regex(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if c.is_ascii_punctuation() {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Double-quote a value inside an `or=(...)` tree.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn decode_error(status: u16, body: &str) -> StoreError {
    let parsed: PostgrestErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .details
        .clone()
        .filter(|d| !d.is_empty())
        .or(parsed.message.clone())
        .unwrap_or_else(|| body.trim().to_string());

    match parsed.code.as_deref() {
        Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation { message },
        Some(INVALID_TEXT_REPRESENTATION) => return StoreError::InvalidInput { message },
        _ => {}
    }

    StoreError::Rejected {
        status,
        code: parsed.code,
        message: parsed.message.unwrap_or(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_url_tolerates_trailing_slash() {
        let client = PostgrestClient::new("https://abc.supabase.co/", "key").unwrap();
        assert_eq!(
            client.table_url("users").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/users"
        );

        let client = PostgrestClient::new("http://localhost:54321", "key").unwrap();
        assert_eq!(
            client.table_url("admins").unwrap().as_str(),
            "http://localhost:54321/rest/v1/admins"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            PostgrestClient::new("not a url", "key"),
            Err(StoreError::Transport(_))
        ));
    }

    #[test]
    fn equality_and_limit_encode_as_operators() {
        let params = query_params(&Query::new().eq("username", "super.admin").limit(1));
        assert_eq!(
            params,
            vec![
                ("username".to_string(), "eq.super.admin".to_string()),
                ("limit".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn search_encodes_quoted_imatch_tree() {
        let params = query_params(&Query::new().contains_any(["full_name", "email"], "jane"));
        assert_eq!(
            params,
            vec![(
                "or".to_string(),
                r#"(full_name.imatch."jane",email.imatch."jane")"#.to_string()
            )]
        );
    }

    #[test]
    fn search_escapes_reserved_characters() {
        let params = query_params(&Query::new().contains_any(["email"], r#"a_b,"c"#));
        assert_eq!(params[0].1, r#"(email.imatch."a\\_b\\,\\\"c")"#);
    }

    #[test]
    fn search_star_is_literal() {
        assert_eq!(escape_regex("a*b.c"), r"a\*b\.c");
        assert_eq!(escape_regex("jane doe"), "jane doe");
        let params = query_params(&Query::new().contains_any(["full_name"], "a*b"));
        assert_eq!(params[0].1, r#"(full_name.imatch."a\\*b")"#);
    }

    #[test]
    fn unique_violation_is_recognised() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint \"users_email_key\"","details":"Key (email)=(jane@x.com) already exists.","hint":null}"#;
        match decode_error(409, body) {
            StoreError::UniqueViolation { message } => {
                assert_eq!(message, "Key (email)=(jane@x.com) already exists.")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_uuid_is_invalid_input() {
        let body = r#"{"code":"22P02","message":"invalid input syntax for type uuid: \"nope\"","details":null,"hint":null}"#;
        assert!(matches!(
            decode_error(400, body),
            StoreError::InvalidInput { .. }
        ));
    }

    #[test]
    fn other_errors_keep_status_and_code() {
        let body = r#"{"code":"PGRST205","message":"Could not find the table 'public.users'","details":null,"hint":null}"#;
        match decode_error(404, body) {
            StoreError::Rejected {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("PGRST205"));
                assert_eq!(message, "Could not find the table 'public.users'");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(matches!(
            decode_error(502, "Bad Gateway"),
            StoreError::Rejected { status: 502, code: None, ref message } if message == "Bad Gateway"
        ));
    }
}
