//! Transfer orchestration
//!
//! Validates a transfer request, then runs the whole unit of work inside one
//! SQLite transaction: insert the completed transfer, append the debit entry,
//! append the credit entry. The source balance is read inside the same
//! transaction as the debit, so concurrent transfers from one account cannot
//! both observe a stale balance and overdraw it.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use super::error::TransferError;
use super::models::{NewTransfer, Transfer, TransferRequest, TransferStatus};
use super::store::TransferStore;
use crate::ledger::balance::BalanceResolver;
use crate::ledger::models::{EventKind, NewLedgerEntry};
use crate::ledger::store::LedgerStore;
use crate::member::directory::AccountDirectory;

/// Pagination defaults and bounds for transfer listings
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Coordinates the account directory, ledger store and transfer store
pub struct TransferOrchestrator {
    pool: SqlitePool,
    directory: Arc<dyn AccountDirectory>,
    ledger: Arc<dyn LedgerStore>,
    transfers: Arc<dyn TransferStore>,
    resolver: BalanceResolver,
}

impl TransferOrchestrator {
    /// Create a new orchestrator over injected store implementations
    pub fn new(
        pool: SqlitePool,
        directory: Arc<dyn AccountDirectory>,
        ledger: Arc<dyn LedgerStore>,
        transfers: Arc<dyn TransferStore>,
    ) -> Self {
        let resolver = BalanceResolver::new(ledger.clone(), directory.clone());
        Self {
            pool,
            directory,
            ledger,
            transfers,
            resolver,
        }
    }

    /// Execute a transfer: debit the source, credit the destination, record
    /// both ledger entries, all-or-nothing.
    ///
    /// A caller-supplied idempotency token that is already stored
    /// short-circuits to the existing transfer without re-executing side
    /// effects.
    pub async fn create_transfer(&self, req: TransferRequest) -> Result<Transfer, TransferError> {
        if req.from_member_id == req.to_member_id {
            return Err(TransferError::SelfTransfer);
        }
        if req.amount <= 0 {
            return Err(TransferError::InvalidAmount);
        }

        // Idempotent replay: a known token means the work already happened
        if let Some(token) = &req.idempotency_token {
            let mut conn = self
                .pool
                .acquire()
                .await
                .map_err(|e| TransferError::database("acquire connection", e))?;
            if let Some(existing) = self
                .transfers
                .find_by_token(&mut conn, token)
                .await
                .map_err(|e| TransferError::database("find transfer by token", e))?
            {
                info!(
                    transfer_id = existing.id,
                    token = %token,
                    "Duplicate idempotency token, returning existing transfer"
                );
                return Ok(existing);
            }
        }

        let token = req
            .idempotency_token
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // One transaction for the balance check and every write; any early
        // return drops the transaction and rolls everything back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TransferError::database("begin transaction", e))?;

        if !self
            .directory
            .exists(&mut tx, req.from_member_id)
            .await
            .map_err(|e| TransferError::database("check source member", e))?
        {
            return Err(TransferError::AccountNotFound(req.from_member_id));
        }
        if !self
            .directory
            .exists(&mut tx, req.to_member_id)
            .await
            .map_err(|e| TransferError::database("check destination member", e))?
        {
            return Err(TransferError::AccountNotFound(req.to_member_id));
        }

        let source_balance = self.resolver.balance(&mut tx, req.from_member_id).await?;
        if source_balance < req.amount {
            return Err(TransferError::InsufficientBalance);
        }

        let now = Utc::now();
        let new_transfer = NewTransfer {
            from_member_id: req.from_member_id,
            to_member_id: req.to_member_id,
            amount: req.amount,
            status: TransferStatus::Completed,
            note: req.note.clone(),
            idempotency_token: token.clone(),
            created_at: now,
            updated_at: now,
            completed_at: Some(now),
            fail_reason: None,
        };

        let transfer = match self.transfers.insert(&mut tx, &new_transfer).await {
            Ok(t) => t,
            Err(e) if is_unique_violation(&e) => {
                // Lost a token race against a concurrent retry; the winner's
                // transfer is the one to return.
                drop(tx);
                let mut conn = self
                    .pool
                    .acquire()
                    .await
                    .map_err(|e| TransferError::database("acquire connection", e))?;
                return match self
                    .transfers
                    .find_by_token(&mut conn, &token)
                    .await
                    .map_err(|e| TransferError::database("find transfer by token", e))?
                {
                    Some(existing) => Ok(existing),
                    None => Err(TransferError::database("insert transfer", e)),
                };
            }
            Err(e) => return Err(TransferError::database("insert transfer", e)),
        };

        self.ledger
            .append(
                &mut tx,
                NewLedgerEntry {
                    member_id: req.from_member_id,
                    change: -req.amount,
                    balance_after: source_balance - req.amount,
                    event_kind: EventKind::TransferOut,
                    transfer_id: Some(transfer.id),
                    reference: None,
                    metadata: None,
                },
            )
            .await
            .map_err(|e| TransferError::database("append debit entry", e))?;

        let destination_balance = self.resolver.balance(&mut tx, req.to_member_id).await?;
        self.ledger
            .append(
                &mut tx,
                NewLedgerEntry {
                    member_id: req.to_member_id,
                    change: req.amount,
                    balance_after: destination_balance + req.amount,
                    event_kind: EventKind::TransferIn,
                    transfer_id: Some(transfer.id),
                    reference: None,
                    metadata: None,
                },
            )
            .await
            .map_err(|e| TransferError::database("append credit entry", e))?;

        tx.commit()
            .await
            .map_err(|e| TransferError::database("commit transaction", e))?;

        info!(
            transfer_id = transfer.id,
            from = req.from_member_id,
            to = req.to_member_id,
            amount = req.amount,
            "Transfer completed"
        );
        Ok(transfer)
    }

    /// Exact lookup by idempotency token
    pub async fn get_by_token(&self, token: &str) -> Result<Transfer, TransferError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| TransferError::database("acquire connection", e))?;
        self.transfers
            .find_by_token(&mut conn, token)
            .await
            .map_err(|e| TransferError::database("find transfer by token", e))?
            .ok_or_else(|| TransferError::TransferNotFound(token.to_string()))
    }

    /// Paginated transfer history for a member (source or destination),
    /// newest first, with the total matching count.
    ///
    /// Out-of-range page/page_size values are clamped, not rejected.
    pub async fn list_by_member(
        &self,
        member_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Transfer>, i64), TransferError> {
        let page = page.max(1);
        let page_size = if page_size == 0 || page_size > MAX_PAGE_SIZE {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| TransferError::database("acquire connection", e))?;
        self.transfers
            .find_by_member(&mut conn, member_id, page, page_size)
            .await
            .map_err(|e| TransferError::database("list transfers by member", e))
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}
