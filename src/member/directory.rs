//! Account directory capability consumed by the transfer core
//!
//! The orchestrator only needs two answers from the member store: does this
//! account exist, and what balance was it seeded with. Methods take a
//! `SqliteConnection` so the caller can run them inside its own transaction.

use async_trait::async_trait;
use sqlx::SqliteConnection;

/// Resolves member accounts for the transfer core
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Whether a member with this id exists
    async fn exists(&self, conn: &mut SqliteConnection, member_id: i64)
    -> Result<bool, sqlx::Error>;

    /// The member's seeded point balance, `None` when the member is unknown
    async fn seed_balance(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> Result<Option<i64>, sqlx::Error>;
}

/// Directory backed by the members table
pub struct SqliteAccountDirectory;

#[async_trait]
impl AccountDirectory for SqliteAccountDirectory {
    async fn exists(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM members WHERE id = ?")
            .bind(member_id)
            .fetch_optional(conn)
            .await?;
        Ok(found.is_some())
    }

    async fn seed_balance(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("SELECT points FROM members WHERE id = ?")
            .bind(member_id)
            .fetch_optional(conn)
            .await
    }
}
