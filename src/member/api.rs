//! Member API layer
//!
//! HTTP handlers for member profile CRUD and ledger history.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde::Deserialize;

use super::models::MemberProfile;
use super::repository::MemberRepository;
use crate::ledger::store::{LedgerStore, SqliteLedgerStore};
use crate::server::{AppState, ErrorResponse};

/// Member profile payload for create/update
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberPayload {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub member_since: Option<String>,
    pub level: Option<String>,
    pub member_code: Option<String>,
    #[serde(default)]
    pub points: i64,
}

impl MemberPayload {
    fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.points < 0 {
            return Err("points must not be negative");
        }
        Ok(())
    }

    fn into_profile(self) -> MemberProfile {
        MemberProfile {
            name: self.name,
            phone: self.phone,
            email: self.email,
            member_since: self.member_since,
            level: self.level,
            member_code: self.member_code,
            points: self.points,
        }
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/members", get(get_all_members).post(create_member))
        .route(
            "/members/{id}",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/members/{id}/ledger", get(get_member_ledger))
}

fn internal_error(e: impl ToString) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("INTERNAL_ERROR", e)),
    )
        .into_response()
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("MEMBER_NOT_FOUND", "Member not found")),
    )
        .into_response()
}

/// GET /members
async fn get_all_members(State(state): State<Arc<AppState>>) -> Response {
    match MemberRepository::get_all(state.db.pool()).await {
        Ok(members) => Json(members).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /members/{id}
async fn get_member(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match MemberRepository::get_by_id(state.db.pool(), id).await {
        Ok(Some(member)) => Json(member).into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

/// POST /members
async fn create_member(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MemberPayload>,
) -> Response {
    if let Err(msg) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("VALIDATION_ERROR", msg)),
        )
            .into_response();
    }

    match MemberRepository::create(state.db.pool(), &payload.into_profile()).await {
        Ok(member) => (StatusCode::CREATED, Json(member)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// PUT /members/{id}
async fn update_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<MemberPayload>,
) -> Response {
    if let Err(msg) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("VALIDATION_ERROR", msg)),
        )
            .into_response();
    }

    match MemberRepository::update(state.db.pool(), id, &payload.into_profile()).await {
        Ok(Some(member)) => Json(member).into_response(),
        Ok(None) => not_found(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /members/{id}
///
/// Members referenced by transfers or ledger entries cannot be removed; the
/// history must stay attributable.
async fn delete_member(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    match MemberRepository::delete(state.db.pool(), id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => not_found(),
        Err(e) if is_foreign_key_violation(&e) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::new(
                "MEMBER_HAS_HISTORY",
                "Member has transfer or ledger history and cannot be deleted",
            )),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

/// GET /members/{id}/ledger
async fn get_member_ledger(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> Response {
    let mut conn = match state.db.pool().acquire().await {
        Ok(conn) => conn,
        Err(e) => return internal_error(e),
    };
    match SqliteLedgerStore.list_by_member(&mut conn, id).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => internal_error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::member::directory::SqliteAccountDirectory;
    use crate::transfer::{SqliteTransferStore, TransferOrchestrator, TransferRequest};

    async fn state_with_members() -> (Arc<AppState>, i64, i64) {
        let db = Arc::new(test_db().await);
        let orchestrator = Arc::new(TransferOrchestrator::new(
            db.pool().clone(),
            Arc::new(SqliteAccountDirectory),
            Arc::new(SqliteLedgerStore),
            Arc::new(SqliteTransferStore),
        ));

        let profile = |name: &str, points: i64| MemberProfile {
            name: name.to_string(),
            phone: None,
            email: None,
            member_since: None,
            level: None,
            member_code: None,
            points,
        };
        let a = MemberRepository::create(db.pool(), &profile("A", 500))
            .await
            .unwrap()
            .id;
        let b = MemberRepository::create(db.pool(), &profile("B", 0))
            .await
            .unwrap()
            .id;

        (Arc::new(AppState { db, orchestrator }), a, b)
    }

    #[tokio::test]
    async fn test_delete_member_without_history() {
        let (state, a, _b) = state_with_members().await;

        let response = delete_member(State(state.clone()), Path(a)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_delete_member_with_history_conflicts() {
        let (state, a, b) = state_with_members().await;
        state
            .orchestrator
            .create_transfer(TransferRequest {
                from_member_id: a,
                to_member_id: b,
                amount: 100,
                note: None,
                idempotency_token: None,
            })
            .await
            .unwrap();

        let response = delete_member(State(state.clone()), Path(a)).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // The member and their history are untouched
        let member = MemberRepository::get_by_id(state.db.pool(), a)
            .await
            .unwrap();
        assert!(member.is_some());
    }
}
