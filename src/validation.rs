// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Member registration validation.
//!
//! Works on the raw JSON body rather than a typed struct so that type
//! mismatches, unknown keys and rule violations are all collected and
//! reported together instead of failing on the first serde error.
//!
//! The same rules run in two places with different strictness: the server
//! treats `phone` as optional ([`ValidationPolicy::server`]) while the client
//! form requires it ([`ValidationPolicy::client`]). Only the server result is
//! authoritative.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::models::{MembershipType, NewMember, Sport};

/// Upper bound, in characters, for the free-text fields.
pub const MAX_FREE_TEXT_CHARS: usize = 1000;

/// Minimum phone length, in characters, when the phone is required.
pub const MIN_PHONE_CHARS: usize = 6;

const KNOWN_FIELDS: [&str; 9] = [
    "full_name",
    "email",
    "phone",
    "linkedin",
    "referred_by",
    "membership_type",
    "sports",
    "why_join",
    "contribution",
];

/// Validation strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    /// Phone must be present and at least [`MIN_PHONE_CHARS`] long.
    pub require_phone: bool,
}

impl ValidationPolicy {
    /// Rules applied by the API. Phone is optional.
    pub const fn server() -> Self {
        Self {
            require_phone: false,
        }
    }

    /// Rules applied by the registration form. Phone is required.
    pub const fn client() -> Self {
        Self {
            require_phone: true,
        }
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::server()
    }
}

/// One violated rule.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every rule a payload violated, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Whether `field` has at least one violation.
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// The first message, for callers that show a single line.
    pub fn summary(&self) -> String {
        self.errors
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_else(|| "Validation failed".to_string())
    }
}

/// Validate a raw registration payload and normalize it.
pub fn validate_new_member(
    payload: &Value,
    policy: ValidationPolicy,
) -> Result<NewMember, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(object) = payload.as_object() else {
        errors.push("body", "Request body must be a JSON object");
        return Err(errors);
    };

    let full_name = required_string(object, "full_name", "Full name", &mut errors);

    let email = required_string(object, "email", "Email", &mut errors).and_then(|email| {
        if is_deliverable_email(&email) {
            Some(email.to_lowercase())
        } else {
            errors.push("email", "Email must be valid");
            None
        }
    });

    let phone = optional_string(object, "phone", "Phone", &mut errors);
    if policy.require_phone
        && !errors.has("phone")
        && phone.as_ref().map_or(true, |p| p.chars().count() < MIN_PHONE_CHARS)
    {
        errors.push("phone", "Enter a valid phone number");
    }

    let linkedin = optional_string(object, "linkedin", "LinkedIn", &mut errors);
    let referred_by = optional_string(object, "referred_by", "Referred by", &mut errors);
    let membership_type = membership_type(object, &mut errors);
    let sports = sports(object, &mut errors);
    let why_join = free_text(object, "why_join", "Why join", &mut errors);
    let contribution = free_text(object, "contribution", "Contribution", &mut errors);

    for key in object.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            errors.push(key, format!("property {key} should not exist"));
        }
    }

    match (full_name, email) {
        (Some(full_name), Some(email)) if errors.is_empty() => Ok(NewMember {
            full_name,
            email,
            phone,
            linkedin,
            referred_by,
            membership_type,
            sports,
            why_join,
            contribution,
        }),
        _ => Err(errors),
    }
}

/// Syntactically valid address whose domain carries a top-level label.
///
/// `jane@localhost` passes the RFC check but is refused here, as it is by
/// the registration form.
fn is_deliverable_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty()
        && tld.chars().count() >= 2
        && tld.chars().all(|c| c.is_alphanumeric() || c == '-')
}

/// Present, non-null value for `key`.
fn field<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

fn required_string(
    object: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match field(object, key) {
        None => {
            errors.push(key, format!("{label} is required"));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            errors.push(key, format!("{label} is required"));
            None
        }
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            errors.push(key, format!("{label} must be a string"));
            None
        }
    }
}

/// Optional string; blank collapses to `None`.
fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match field(object, key) {
        None => None,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(_) => {
            errors.push(key, format!("{label} must be a string"));
            None
        }
    }
}

fn free_text(
    object: &Map<String, Value>,
    key: &str,
    label: &str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    let text = optional_string(object, key, label, errors)?;
    if text.chars().count() > MAX_FREE_TEXT_CHARS {
        errors.push(
            key,
            format!("{label} must be at most {MAX_FREE_TEXT_CHARS} characters"),
        );
        return None;
    }
    Some(text)
}

fn membership_type(object: &Map<String, Value>, errors: &mut ValidationErrors) -> MembershipType {
    let allowed = || {
        MembershipType::ALL
            .iter()
            .map(MembershipType::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };

    match field(object, "membership_type") {
        None => MembershipType::default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_else(|()| {
            errors.push(
                "membership_type",
                format!("Membership type must be one of: {}", allowed()),
            );
            MembershipType::default()
        }),
        Some(_) => {
            errors.push("membership_type", "Membership type must be a string");
            MembershipType::default()
        }
    }
}

fn sports(object: &Map<String, Value>, errors: &mut ValidationErrors) -> Vec<Sport> {
    let items = match field(object, "sports") {
        None => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.push("sports", "Sports must be an array");
            return Vec::new();
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    let mut seen = HashSet::new();
    let mut invalid = false;
    let mut duplicate = false;

    for item in items {
        match item.as_str().map(|s| s.parse::<Sport>()) {
            Some(Ok(sport)) => {
                if seen.insert(sport) {
                    parsed.push(sport);
                } else {
                    duplicate = true;
                }
            }
            _ => invalid = true,
        }
    }

    if invalid {
        let allowed = Sport::ALL
            .iter()
            .map(Sport::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        errors.push("sports", format!("Sports must contain only: {allowed}"));
    }
    if duplicate {
        errors.push("sports", "Sports must not contain duplicates");
    }

    parsed
}
