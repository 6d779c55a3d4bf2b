//! Repository layer for member profile operations

use super::models::{Member, MemberProfile};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const MEMBER_COLUMNS: &str =
    "id, name, phone, email, member_since, level, member_code, points, created_at, updated_at";

/// Member repository for CRUD operations
pub struct MemberRepository;

impl MemberRepository {
    /// List all members
    pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Member>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {} FROM members ORDER BY id", MEMBER_COLUMNS))
            .fetch_all(pool)
            .await?;

        rows.iter().map(row_to_member).collect()
    }

    /// Get member by ID
    pub async fn get_by_id(pool: &SqlitePool, member_id: i64) -> Result<Option<Member>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {} FROM members WHERE id = ?", MEMBER_COLUMNS))
            .bind(member_id)
            .fetch_optional(pool)
            .await?;

        row.as_ref().map(row_to_member).transpose()
    }

    /// Enroll a new member
    pub async fn create(pool: &SqlitePool, profile: &MemberProfile) -> Result<Member, sqlx::Error> {
        let now = Utc::now();
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO members (name, phone, email, member_since, level, member_code, points, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.member_since)
        .bind(&profile.level)
        .bind(&profile.member_code)
        .bind(profile.points)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(Member {
            id,
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            email: profile.email.clone(),
            member_since: profile.member_since.clone(),
            level: profile.level.clone(),
            member_code: profile.member_code.clone(),
            points: profile.points,
            created_at: now,
            updated_at: now,
        })
    }

    /// Update a member's profile fields
    ///
    /// The seeded `points` column is deliberately left untouched: balances
    /// change only through the ledger.
    pub async fn update(
        pool: &SqlitePool,
        member_id: i64,
        profile: &MemberProfile,
    ) -> Result<Option<Member>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET name = ?, phone = ?, email = ?, member_since = ?, level = ?, member_code = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.name)
        .bind(&profile.phone)
        .bind(&profile.email)
        .bind(&profile.member_since)
        .bind(&profile.level)
        .bind(&profile.member_code)
        .bind(Utc::now())
        .bind(member_id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::get_by_id(pool, member_id).await
    }

    /// Delete a member, returning whether a row was removed
    pub async fn delete(pool: &SqlitePool, member_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(member_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_member(row: &SqliteRow) -> Result<Member, sqlx::Error> {
    Ok(Member {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        member_since: row.try_get("member_since")?,
        level: row.try_get("level")?,
        member_code: row.try_get("member_code")?,
        points: row.try_get("points")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
