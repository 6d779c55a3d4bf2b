//! Append-only storage of point-change events
//!
//! The ledger is the sole source of truth for balance history. Entries are
//! never updated or deleted; ordering is created_at with rowid breaking ties,
//! so "latest" is well-defined even for entries written in the same instant.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::models::{EventKind, LedgerEntry, NewLedgerEntry};

/// Ledger store capability
///
/// Methods take a `SqliteConnection` so appends can share the orchestrator's
/// transaction scope.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append one entry, assigning its id and creation timestamp
    async fn append(
        &self,
        conn: &mut SqliteConnection,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, sqlx::Error>;

    /// All entries for a member, newest first
    async fn list_by_member(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error>;

    /// The newest entry's balance_after, `None` when the member has no history
    async fn latest_balance(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> Result<Option<i64>, sqlx::Error>;
}

/// Ledger store backed by the point_ledger table
pub struct SqliteLedgerStore;

#[async_trait]
impl LedgerStore for SqliteLedgerStore {
    async fn append(
        &self,
        conn: &mut SqliteConnection,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, sqlx::Error> {
        let now = Utc::now();
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO point_ledger (member_id, change, balance_after, event_kind, transfer_id, reference, metadata, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(entry.member_id)
        .bind(entry.change)
        .bind(entry.balance_after)
        .bind(entry.event_kind.as_str())
        .bind(entry.transfer_id)
        .bind(&entry.reference)
        .bind(&entry.metadata)
        .bind(now)
        .fetch_one(conn)
        .await?;

        Ok(LedgerEntry {
            id,
            member_id: entry.member_id,
            change: entry.change,
            balance_after: entry.balance_after,
            event_kind: entry.event_kind,
            transfer_id: entry.transfer_id,
            reference: entry.reference,
            metadata: entry.metadata,
            created_at: now,
        })
    }

    async fn list_by_member(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, member_id, change, balance_after, event_kind, transfer_id, reference, metadata, created_at
            FROM point_ledger
            WHERE member_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(conn)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }

    async fn latest_balance(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT balance_after FROM point_ledger
            WHERE member_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(member_id)
        .fetch_optional(conn)
        .await
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<LedgerEntry, sqlx::Error> {
    let kind_str: String = row.try_get("event_kind")?;
    let event_kind = EventKind::parse(&kind_str)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown event kind: {}", kind_str).into()))?;

    Ok(LedgerEntry {
        id: row.try_get("id")?,
        member_id: row.try_get("member_id")?,
        change: row.try_get("change")?,
        balance_after: row.try_get("balance_after")?,
        event_kind,
        transfer_id: row.try_get("transfer_id")?,
        reference: row.try_get("reference")?,
        metadata: row.try_get("metadata")?,
        created_at: row.try_get("created_at")?,
    })
}
