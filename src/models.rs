// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API together with the internal member representation.
//!
//! ## Two Member Shapes
//!
//! - [`MemberRecord`] is the external representation: snake_case keys as
//!   stored in the `users` table and exchanged over HTTP. Optional values are
//!   absent rather than empty.
//! - [`Member`] is the internal representation: camelCase keys as consumed by
//!   the frontend, with absent values replaced by empty strings or lists.
//!
//! Conversions between the two live in [`crate::mapper`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Enumerations
// =============================================================================

/// Membership tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MembershipType {
    #[default]
    Basic,
    Active,
    Premium,
    #[serde(rename = "VIP")]
    Vip,
}

impl MembershipType {
    pub const ALL: [MembershipType; 4] = [
        MembershipType::Basic,
        MembershipType::Active,
        MembershipType::Premium,
        MembershipType::Vip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipType::Basic => "Basic",
            MembershipType::Active => "Active",
            MembershipType::Premium => "Premium",
            MembershipType::Vip => "VIP",
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipType {
    type Err = ();

    /// Exact, case-sensitive match on the tier name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|t| t.as_str() == s).ok_or(())
    }
}

/// Sport a member wants to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Sport {
    Tennis,
    Badminton,
    Squash,
    Pickleball,
    Padel,
}

impl Sport {
    pub const ALL: [Sport; 5] = [
        Sport::Tennis,
        Sport::Badminton,
        Sport::Squash,
        Sport::Pickleball,
        Sport::Padel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Tennis => "Tennis",
            Sport::Badminton => "Badminton",
            Sport::Squash => "Squash",
            Sport::Pickleball => "Pickleball",
            Sport::Padel => "Padel",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sport {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|sport| sport.as_str() == s).ok_or(())
    }
}

// =============================================================================
// Member Models
// =============================================================================

/// Member registration payload as sent by clients.
///
/// The server does not deserialize into this type directly; the raw JSON is
/// run through [`crate::validation`] so that every violated field can be
/// reported at once. This type documents the accepted shape and is what the
/// API client submits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct CreateMemberRequest {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    /// Defaults to `Basic` when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_type: Option<MembershipType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sports: Vec<Sport>,
    /// At most 1000 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_join: Option<String>,
    /// At most 1000 characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<String>,
}

/// A validated, normalized registration ready to be persisted.
///
/// Strings are trimmed, the email is lower-cased and `sports` holds no
/// duplicates. Optional text that was blank is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub referred_by: Option<String>,
    pub membership_type: MembershipType,
    pub sports: Vec<Sport>,
    pub why_join: Option<String>,
    pub contribution: Option<String>,
}

/// A member row as stored in the `users` table and returned over HTTP.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MemberRecord {
    /// Store-assigned identifier. Absent on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub membership_type: MembershipType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sports: Option<Vec<Sport>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why_join: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<String>,
    /// Store-assigned creation timestamp. Absent on insert.
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

/// Store columns may be present but `null`; treat that like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamp formats a `timestamp` column may come back in without an offset.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a stored timestamp.
///
/// Accepts RFC 3339, Postgres text output with a short offset (`+00`) and
/// offset-less values, which are taken as UTC. Anything else reads as absent.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Internal member representation.
///
/// Never carries absent values: missing text is `""` and missing sports are
/// an empty list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub referred_by: String,
    pub membership: MembershipType,
    pub sports: Vec<Sport>,
    pub joining_reason: String,
    pub contribution: String,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for member listing.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct MemberSearchQuery {
    /// Case-insensitive substring matched against name or email.
    pub search: Option<String>,
}

// =============================================================================
// Admin Models
// =============================================================================

/// Admin account row from the `admins` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminRecord {
    pub id: String,
    pub username: String,
    /// bcrypt hash; the column is named `password` in the store.
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn enums_use_display_names_on_the_wire() {
        assert_eq!(serde_json::to_value(MembershipType::Vip).unwrap(), json!("VIP"));
        assert_eq!(serde_json::to_value(Sport::Pickleball).unwrap(), json!("Pickleball"));
        assert_eq!("VIP".parse::<MembershipType>(), Ok(MembershipType::Vip));
        assert!("vip".parse::<MembershipType>().is_err());
        assert!("Golf".parse::<Sport>().is_err());
    }

    #[test]
    fn member_record_omits_absent_fields() {
        let record = MemberRecord {
            full_name: "Jane Doe".into(),
            email: Some("jane@x.com".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "full_name": "Jane Doe",
                "email": "jane@x.com",
                "membership_type": "Basic"
            })
        );
    }

    #[test]
    fn member_record_accepts_store_nulls() {
        let record: MemberRecord = serde_json::from_value(json!({
            "id": "7d3c",
            "full_name": "Jane Doe",
            "email": "jane@x.com",
            "phone": null,
            "sports": null,
            "membership_type": null,
            "created_at": "2026-01-02T03:04:05.123456+00:00"
        }))
        .unwrap();
        assert_eq!(record.phone, None);
        assert_eq!(record.sports, None);
        assert_eq!(record.membership_type, MembershipType::Basic);
        assert!(record.created_at.is_some());

        let record: MemberRecord =
            serde_json::from_value(json!({ "full_name": "Sam", "membership_type": "VIP" })).unwrap();
        assert_eq!(record.membership_type, MembershipType::Vip);
    }

    #[test]
    fn stored_timestamps_parse_leniently() {
        let expected = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        for raw in [
            "2026-01-02T03:04:05Z",
            "2026-01-02T05:04:05+02:00",
            "2026-01-02 03:04:05+00",
            "2026-01-02T03:04:05",
            "2026-01-02 03:04:05",
        ] {
            assert_eq!(parse_timestamp(raw), Some(expected), "{raw}");
        }
        let micros = parse_timestamp("2026-01-02T03:04:05.123456").unwrap();
        assert_eq!(micros.timestamp_subsec_micros(), 123_456);
        assert_eq!(parse_timestamp("last tuesday"), None);

        let record: MemberRecord = serde_json::from_value(json!({
            "full_name": "Jane Doe",
            "created_at": "2026-01-02T03:04:05.123456"
        }))
        .unwrap();
        assert_eq!(record.created_at, Some(micros));

        let record: MemberRecord = serde_json::from_value(json!({
            "full_name": "Jane Doe",
            "created_at": "garbage"
        }))
        .unwrap();
        assert_eq!(record.created_at, None);
    }

    #[test]
    fn member_serializes_camel_case() {
        let member = Member {
            id: "1".into(),
            name: "Jane".into(),
            email: "jane@x.com".into(),
            phone: String::new(),
            linkedin: String::new(),
            referred_by: "Sam".into(),
            membership: MembershipType::Active,
            sports: vec![Sport::Tennis],
            joining_reason: String::new(),
            contribution: String::new(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&member).unwrap();
        assert_eq!(value["referredBy"], "Sam");
        assert_eq!(value["membership"], "Active");
        assert!(value.get("joiningReason").is_some());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn admin_record_reads_password_column() {
        let admin: AdminRecord = serde_json::from_value(json!({
            "id": "a1",
            "username": "superadmin",
            "password": "$2b$10$hash",
            "created_at": "2026-01-02T03:04:05Z"
        }))
        .unwrap();
        assert_eq!(admin.password_hash, "$2b$10$hash");
    }
}
