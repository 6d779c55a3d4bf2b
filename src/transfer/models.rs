//! Transfer record types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Transfer lifecycle status
///
/// Only `completed` is written today; the other values are reserved for
/// asynchronous processing and reversal flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Reversed,
}

impl TransferStatus {
    /// TEXT value stored in the transfers table
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Processing => "processing",
            TransferStatus::Completed => "completed",
            TransferStatus::Failed => "failed",
            TransferStatus::Cancelled => "cancelled",
            TransferStatus::Reversed => "reversed",
        }
    }

    /// Convert from the stored TEXT value
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransferStatus::Pending),
            "processing" => Some(TransferStatus::Processing),
            "completed" => Some(TransferStatus::Completed),
            "failed" => Some(TransferStatus::Failed),
            "cancelled" => Some(TransferStatus::Cancelled),
            "reversed" => Some(TransferStatus::Reversed),
            _ => None,
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A point transfer between two members
///
/// A completed transfer owns exactly two ledger entries (debit and credit)
/// linked by its id. Never mutated after creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: i64,
    pub from_member_id: i64,
    pub to_member_id: i64,
    pub amount: i64,
    pub status: TransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub idempotency_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
}

/// Transfer fields prior to id assignment by the store
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub from_member_id: i64,
    pub to_member_id: i64,
    pub amount: i64,
    pub status: TransferStatus,
    pub note: Option<String>,
    pub idempotency_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub fail_reason: Option<String>,
}

/// A transfer request accepted by the orchestrator
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_member_id: i64,
    pub to_member_id: i64,
    pub amount: i64,
    pub note: Option<String>,
    /// Caller-supplied idempotency token; a fresh one is minted when absent
    pub idempotency_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text_values() {
        assert_eq!(TransferStatus::Completed.as_str(), "completed");
        assert_eq!(TransferStatus::parse("reversed"), Some(TransferStatus::Reversed));
        assert_eq!(TransferStatus::parse("done"), None);
    }
}
