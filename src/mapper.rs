// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Field mapping between the external and internal member representations.
//!
//! This is the only place that knows `full_name` is `name`,
//! `membership_type` is `membership` and `why_join` is `joiningReason`.
//! Both the write path (registration) and the read path (list, get, delete)
//! go through here.

use chrono::Utc;

use crate::models::{Member, MemberRecord, NewMember};

/// Outbound: a normalized registration to the row inserted into the store.
///
/// Blank optional text and an empty sport set become absent. `id` and
/// `created_at` are left for the store to assign.
pub fn to_record(member: &NewMember) -> MemberRecord {
    MemberRecord {
        id: None,
        full_name: member.full_name.trim().to_string(),
        email: present(Some(&member.email)),
        phone: present(member.phone.as_deref()),
        linkedin: present(member.linkedin.as_deref()),
        referred_by: present(member.referred_by.as_deref()),
        membership_type: member.membership_type,
        sports: (!member.sports.is_empty()).then(|| member.sports.clone()),
        why_join: present(member.why_join.as_deref()),
        contribution: present(member.contribution.as_deref()),
        created_at: None,
    }
}

/// Inbound: a stored row to the internal representation.
///
/// Absent text becomes `""`, absent sports become `[]`. A missing
/// `created_at` falls back to the current time for display purposes only.
pub fn from_record(record: MemberRecord) -> Member {
    Member {
        id: record.id.unwrap_or_default(),
        name: record.full_name,
        email: record.email.unwrap_or_default(),
        phone: record.phone.unwrap_or_default(),
        linkedin: record.linkedin.unwrap_or_default(),
        referred_by: record.referred_by.unwrap_or_default(),
        membership: record.membership_type,
        sports: record.sports.unwrap_or_default(),
        joining_reason: record.why_join.unwrap_or_default(),
        contribution: record.contribution.unwrap_or_default(),
        created_at: record.created_at.unwrap_or_else(Utc::now),
    }
}

/// Internal member back to the external shape used in HTTP responses.
pub fn member_to_record(member: &Member) -> MemberRecord {
    MemberRecord {
        id: present(Some(&member.id)),
        full_name: member.name.clone(),
        email: present(Some(&member.email)),
        phone: present(Some(&member.phone)),
        linkedin: present(Some(&member.linkedin)),
        referred_by: present(Some(&member.referred_by)),
        membership_type: member.membership,
        sports: (!member.sports.is_empty()).then(|| member.sports.clone()),
        why_join: present(Some(&member.joining_reason)),
        contribution: present(Some(&member.contribution)),
        created_at: Some(member.created_at),
    }
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MembershipType, Sport};
    use chrono::{TimeZone, Utc};

    fn jane() -> NewMember {
        NewMember {
            full_name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            phone: Some("+44 7700 900123".into()),
            linkedin: Some("   ".into()),
            referred_by: None,
            membership_type: MembershipType::Premium,
            sports: vec![Sport::Tennis, Sport::Padel],
            why_join: Some("Love racket sports".into()),
            contribution: Some(String::new()),
        }
    }

    #[test]
    fn outbound_drops_blank_optionals() {
        let record = to_record(&jane());
        assert_eq!(record.id, None);
        assert_eq!(record.created_at, None);
        assert_eq!(record.full_name, "Jane Doe");
        assert_eq!(record.email.as_deref(), Some("jane@x.com"));
        assert_eq!(record.linkedin, None);
        assert_eq!(record.referred_by, None);
        assert_eq!(record.contribution, None);
        assert_eq!(record.sports, Some(vec![Sport::Tennis, Sport::Padel]));

        let mut no_sports = jane();
        no_sports.sports.clear();
        assert_eq!(to_record(&no_sports).sports, None);
    }

    #[test]
    fn inbound_fills_absent_values() {
        let member = from_record(MemberRecord {
            id: Some("m-1".into()),
            full_name: "Sam".into(),
            ..Default::default()
        });
        assert_eq!(member.id, "m-1");
        assert_eq!(member.name, "Sam");
        assert_eq!(member.email, "");
        assert_eq!(member.referred_by, "");
        assert_eq!(member.joining_reason, "");
        assert!(member.sports.is_empty());
        assert_eq!(member.membership, MembershipType::Basic);
    }

    #[test]
    fn inbound_defaults_missing_timestamp_to_now() {
        let before = Utc::now();
        let member = from_record(MemberRecord::default());
        assert!(member.created_at >= before);

        let stamped = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let member = from_record(MemberRecord {
            created_at: Some(stamped),
            ..Default::default()
        });
        assert_eq!(member.created_at, stamped);
    }

    #[test]
    fn stored_record_round_trips_through_internal_shape() {
        let mut record = to_record(&jane());
        record.id = Some("m-42".into());
        record.created_at = Some(Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap());

        let member = from_record(record.clone());
        assert_eq!(member.name, "Jane Doe");
        assert_eq!(member.joining_reason, "Love racket sports");
        assert_eq!(member_to_record(&member), record);
    }
}
