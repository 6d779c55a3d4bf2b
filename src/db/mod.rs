//! Database connection management

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// SQLite database connection pool
///
/// The pool is capped at a single connection: SQLite allows one writer at a
/// time, and the transfer unit of work needs its balance read and ledger
/// writes serialized against every other writer on the same account.
///
/// Never acquire a second connection (or start a transaction) while already
/// holding one on the same task; the nested acquire waits on the held
/// connection and times out after `acquire_timeout`.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        tracing::info!("SQLite connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS members (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                phone TEXT,
                email TEXT,
                member_since TEXT,
                level TEXT,
                member_code TEXT,
                points INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transfers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                from_member_id INTEGER NOT NULL,
                to_member_id INTEGER NOT NULL,
                amount INTEGER NOT NULL CHECK (amount > 0),
                status TEXT NOT NULL CHECK (status IN
                    ('pending','processing','completed','failed','cancelled','reversed')),
                note TEXT,
                idempotency_token TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                completed_at TEXT,
                fail_reason TEXT,
                FOREIGN KEY (from_member_id) REFERENCES members(id),
                FOREIGN KEY (to_member_id) REFERENCES members(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS point_ledger (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                member_id INTEGER NOT NULL,
                change INTEGER NOT NULL,
                balance_after INTEGER NOT NULL,
                event_kind TEXT NOT NULL CHECK (event_kind IN
                    ('transfer_out','transfer_in','adjust','earn','redeem')),
                transfer_id INTEGER,
                reference TEXT,
                metadata TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (member_id) REFERENCES members(id),
                FOREIGN KEY (transfer_id) REFERENCES transfers(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let indexes = [
            "CREATE INDEX IF NOT EXISTS idx_transfers_from ON transfers(from_member_id)",
            "CREATE INDEX IF NOT EXISTS idx_transfers_to ON transfers(to_member_id)",
            "CREATE INDEX IF NOT EXISTS idx_transfers_created ON transfers(created_at)",
            "CREATE INDEX IF NOT EXISTS idx_ledger_member ON point_ledger(member_id)",
            "CREATE INDEX IF NOT EXISTS idx_ledger_transfer ON point_ledger(transfer_id)",
            "CREATE INDEX IF NOT EXISTS idx_ledger_created ON point_ledger(created_at)",
        ];
        for idx in indexes {
            sqlx::query(idx).execute(&self.pool).await?;
        }

        tracing::info!("Database schema initialized");
        Ok(())
    }

    /// Insert sample members when the members table is empty
    pub async fn seed_members(&self) -> Result<(), sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(());
        }

        let now = chrono::Utc::now();
        let samples = [
            ("Somchai Jaidee", "081-234-5678", "somchai@example.com", "Gold", "MBR001234", 15420i64),
            ("Somying Deejai", "081-567-8901", "somying@example.com", "Silver", "MBR001235", 8500i64),
        ];

        for (name, phone, email, level, code, points) in samples {
            sqlx::query(
                r#"
                INSERT INTO members (name, phone, email, member_since, level, member_code, points, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(name)
            .bind(phone)
            .bind(email)
            .bind(now.format("%d/%m/%Y").to_string())
            .bind(level)
            .bind(code)
            .bind(points)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        }

        tracing::info!("Seeded {} sample members", samples.len());
        Ok(())
    }
}

#[cfg(test)]
pub(crate) async fn test_db() -> Database {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");
    db.init_schema().await.expect("Failed to init schema");
    db
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_and_health_check() {
        let db = test_db().await;
        assert!(db.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let db = test_db().await;
        // Second run must not fail on existing tables/indexes
        assert!(db.init_schema().await.is_ok());
    }

    #[tokio::test]
    async fn test_seed_members_once() {
        let db = test_db().await;
        db.seed_members().await.unwrap();
        db.seed_members().await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_amount_check_constraint() {
        let db = test_db().await;
        let now = chrono::Utc::now();
        for id in [1i64, 2] {
            sqlx::query(
                "INSERT INTO members (id, name, points, created_at, updated_at) VALUES (?, ?, 0, ?, ?)",
            )
            .bind(id)
            .bind(format!("member-{}", id))
            .bind(now)
            .bind(now)
            .execute(db.pool())
            .await
            .unwrap();
        }

        let err = sqlx::query(
            r#"
            INSERT INTO transfers (from_member_id, to_member_id, amount, status, idempotency_token, created_at, updated_at)
            VALUES (1, 2, 0, 'completed', 'tok-zero', ?, ?)
            "#,
        )
        .bind(now)
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap_err();
        match err {
            sqlx::Error::Database(db_err) => assert!(db_err.is_check_violation()),
            other => panic!("expected check violation, got {:?}", other),
        }
    }
}
