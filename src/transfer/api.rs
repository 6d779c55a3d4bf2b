//! Transfer API layer
//!
//! HTTP handlers for creating and querying transfers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use super::error::TransferError;
use super::models::{Transfer, TransferRequest};
use crate::server::{AppState, ErrorResponse};

/// API request for creating a transfer
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransferRequest {
    pub from_member_id: i64,
    pub to_member_id: i64,
    pub amount: i64,
    pub note: Option<String>,
    /// Optional caller-supplied idempotency token for safe retries
    pub idempotency_token: Option<String>,
}

/// Paginated transfer listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferListResponse {
    pub data: Vec<Transfer>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub member_id: i64,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/transfers", post(create_transfer).get(list_transfers))
        .route("/transfers/{token}", get(get_transfer))
}

fn error_response(err: &TransferError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        // Full detail goes to the log, not the response body
        tracing::error!(code = err.code(), "{}", err);
    }
    (
        status,
        Json(ErrorResponse::new(err.code(), err.client_message())),
    )
        .into_response()
}

/// POST /transfers
async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateTransferRequest>,
) -> Response {
    if payload.from_member_id <= 0 || payload.to_member_id <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(
                "VALIDATION_ERROR",
                "member ids must be greater than 0",
            )),
        )
            .into_response();
    }

    let req = TransferRequest {
        from_member_id: payload.from_member_id,
        to_member_id: payload.to_member_id,
        amount: payload.amount,
        note: payload.note,
        idempotency_token: payload.idempotency_token,
    };

    // Detached task: a client disconnect must not abort the unit of work
    // mid-transaction; it always runs to commit or full rollback.
    let orchestrator = state.orchestrator.clone();
    let result = tokio::spawn(async move { orchestrator.create_transfer(req).await }).await;

    match result {
        Ok(Ok(transfer)) => {
            let token = transfer.idempotency_token.clone();
            (
                StatusCode::CREATED,
                [(HeaderName::from_static("idempotency-token"), token)],
                Json(serde_json::json!({ "transfer": transfer })),
            )
                .into_response()
        }
        Ok(Err(err)) => error_response(&err),
        Err(e) => error_response(&TransferError::Internal(e.to_string())),
    }
}

/// GET /transfers/{token}
async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Response {
    match state.orchestrator.get_by_token(&token).await {
        Ok(transfer) => Json(serde_json::json!({ "transfer": transfer })).into_response(),
        Err(err) => error_response(&err),
    }
}

/// GET /transfers?memberId=&page=&pageSize=
async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let page = query.page.unwrap_or(1).max(1);
    // Same clamping as the orchestrator so the echoed pageSize is accurate
    let page_size = match query.page_size {
        Some(s) if (1..=super::orchestrator::MAX_PAGE_SIZE).contains(&s) => s,
        _ => super::orchestrator::DEFAULT_PAGE_SIZE,
    };

    match state
        .orchestrator
        .list_by_member(query.member_id, page, page_size)
        .await
    {
        Ok((data, total)) => Json(TransferListResponse {
            page,
            page_size,
            total,
            data,
        })
        .into_response(),
        Err(err) => error_response(&err),
    }
}
