//! Transfer storage keyed by idempotency token

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::models::{NewTransfer, Transfer, TransferStatus};

const TRANSFER_COLUMNS: &str = "id, from_member_id, to_member_id, amount, status, note, \
     idempotency_token, created_at, updated_at, completed_at, fail_reason";

/// Transfer store capability
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Insert a transfer, assigning its id
    ///
    /// Fails with a unique-constraint violation when the idempotency token is
    /// already stored.
    async fn insert(
        &self,
        conn: &mut SqliteConnection,
        transfer: &NewTransfer,
    ) -> Result<Transfer, sqlx::Error>;

    /// Exact lookup by idempotency token
    async fn find_by_token(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<Transfer>, sqlx::Error>;

    /// Transfers where the member is source or destination, newest first,
    /// plus the total matching count
    async fn find_by_member(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Transfer>, i64), sqlx::Error>;
}

/// Transfer store backed by the transfers table
pub struct SqliteTransferStore;

#[async_trait]
impl TransferStore for SqliteTransferStore {
    async fn insert(
        &self,
        conn: &mut SqliteConnection,
        transfer: &NewTransfer,
    ) -> Result<Transfer, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO transfers (from_member_id, to_member_id, amount, status, note, idempotency_token, created_at, updated_at, completed_at, fail_reason)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(transfer.from_member_id)
        .bind(transfer.to_member_id)
        .bind(transfer.amount)
        .bind(transfer.status.as_str())
        .bind(&transfer.note)
        .bind(&transfer.idempotency_token)
        .bind(transfer.created_at)
        .bind(transfer.updated_at)
        .bind(transfer.completed_at)
        .bind(&transfer.fail_reason)
        .fetch_one(conn)
        .await?;

        Ok(Transfer {
            id,
            from_member_id: transfer.from_member_id,
            to_member_id: transfer.to_member_id,
            amount: transfer.amount,
            status: transfer.status,
            note: transfer.note.clone(),
            idempotency_token: transfer.idempotency_token.clone(),
            created_at: transfer.created_at,
            updated_at: transfer.updated_at,
            completed_at: transfer.completed_at,
            fail_reason: transfer.fail_reason.clone(),
        })
    }

    async fn find_by_token(
        &self,
        conn: &mut SqliteConnection,
        token: &str,
    ) -> Result<Option<Transfer>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transfers WHERE idempotency_token = ?",
            TRANSFER_COLUMNS
        ))
        .bind(token)
        .fetch_optional(conn)
        .await?;

        row.as_ref().map(row_to_transfer).transpose()
    }

    async fn find_by_member(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Transfer>, i64), sqlx::Error> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transfers WHERE from_member_id = ? OR to_member_id = ?",
        )
        .bind(member_id)
        .bind(member_id)
        .fetch_one(&mut *conn)
        .await?;

        let offset = (page as i64 - 1) * page_size as i64;
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM transfers
            WHERE from_member_id = ? OR to_member_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
            TRANSFER_COLUMNS
        ))
        .bind(member_id)
        .bind(member_id)
        .bind(page_size as i64)
        .bind(offset)
        .fetch_all(conn)
        .await?;

        let transfers = rows
            .iter()
            .map(row_to_transfer)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((transfers, total))
    }
}

fn row_to_transfer(row: &SqliteRow) -> Result<Transfer, sqlx::Error> {
    let status_str: String = row.try_get("status")?;
    let status = TransferStatus::parse(&status_str)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown status: {}", status_str).into()))?;

    Ok(Transfer {
        id: row.try_get("id")?,
        from_member_id: row.try_get("from_member_id")?,
        to_member_id: row.try_get("to_member_id")?,
        amount: row.try_get("amount")?,
        status,
        note: row.try_get("note")?,
        idempotency_token: row.try_get("idempotency_token")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        completed_at: row.try_get("completed_at")?,
        fail_reason: row.try_get("fail_reason")?,
    })
}
