//! Transfer error types

use thiserror::Error;

use crate::ledger::balance::BalanceError;

/// Transfer error taxonomy
///
/// Business-rule violations are distinct categories so callers can branch on
/// them; store and transaction failures are wrapped without exposing storage
/// internals.
#[derive(Error, Debug, Clone)]
pub enum TransferError {
    // === Business-rule violations (detected before any write) ===
    #[error("Cannot transfer to yourself")]
    SelfTransfer,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Member not found: {0}")]
    AccountNotFound(i64),

    #[error("Insufficient balance")]
    InsufficientBalance,

    // === Lookup miss ===
    #[error("Transfer not found: {0}")]
    TransferNotFound(String),

    // === System errors ===
    #[error("Database error in {op}: {message}")]
    Database { op: &'static str, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::SelfTransfer => "SELF_TRANSFER",
            TransferError::InvalidAmount => "INVALID_AMOUNT",
            TransferError::AccountNotFound(_) => "MEMBER_NOT_FOUND",
            TransferError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            TransferError::TransferNotFound(_) => "TRANSFER_NOT_FOUND",
            TransferError::Database { .. } => "DATABASE_ERROR",
            TransferError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::SelfTransfer => 422,
            TransferError::InvalidAmount => 400,
            TransferError::AccountNotFound(_) => 400,
            TransferError::InsufficientBalance => 409,
            TransferError::TransferNotFound(_) => 404,
            TransferError::Database { .. } | TransferError::Internal(_) => 500,
        }
    }

    /// Message safe to put in an API response body
    ///
    /// Business-rule variants describe themselves. System variants name only
    /// the failed operation; the underlying storage detail stays in the
    /// server log.
    pub fn client_message(&self) -> String {
        match self {
            TransferError::Database { op, .. } => format!("Storage operation failed: {}", op),
            TransferError::Internal(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }

    /// Wrap a store failure with the name of the operation that hit it
    pub fn database(op: &'static str, e: sqlx::Error) -> Self {
        TransferError::Database {
            op,
            message: e.to_string(),
        }
    }
}

impl From<BalanceError> for TransferError {
    fn from(e: BalanceError) -> Self {
        match e {
            BalanceError::UnknownMember(id) => TransferError::AccountNotFound(id),
            BalanceError::Database(e) => TransferError::database("resolve balance", e),
        }
    }
}
