//! Data models for member accounts

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Member account profile
///
/// `points` is the seeded balance assigned when the member is enrolled. It is
/// only authoritative until the member's first ledger entry exists; after
/// that, the current balance is derived from the ledger.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub member_since: Option<String>,
    pub level: Option<String>,
    pub member_code: Option<String>,
    pub points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields for enrolling or updating a member
#[derive(Debug, Clone)]
pub struct MemberProfile {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub member_since: Option<String>,
    pub level: Option<String>,
    pub member_code: Option<String>,
    pub points: i64,
}
