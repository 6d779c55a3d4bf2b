//! Point ledger entry types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Kind of point-change event recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TransferOut,
    TransferIn,
    Adjust,
    Earn,
    Redeem,
}

impl EventKind {
    /// TEXT value stored in the point_ledger table
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TransferOut => "transfer_out",
            EventKind::TransferIn => "transfer_in",
            EventKind::Adjust => "adjust",
            EventKind::Earn => "earn",
            EventKind::Redeem => "redeem",
        }
    }

    /// Convert from the stored TEXT value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "transfer_out" => Some(EventKind::TransferOut),
            "transfer_in" => Some(EventKind::TransferIn),
            "adjust" => Some(EventKind::Adjust),
            "earn" => Some(EventKind::Earn),
            "redeem" => Some(EventKind::Redeem),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable point change for one member
///
/// `balance_after` snapshots the member's balance once this change is
/// applied; the newest entry's snapshot is the member's current balance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i64,
    pub member_id: i64,
    pub change: i64,
    pub balance_after: i64,
    pub event_kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry fields prior to id/timestamp assignment by the store
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub member_id: i64,
    pub change: i64,
    pub balance_after: i64,
    pub event_kind: EventKind,
    pub transfer_id: Option<i64>,
    pub reference: Option<String>,
    pub metadata: Option<String>,
}
