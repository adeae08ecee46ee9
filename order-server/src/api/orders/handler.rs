//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::error::{ApiResponse, AppError, AppResult};
use shared::order::{
    CheckoutReceipt, CheckoutRequest, NormalizedUnitOrder, OrderStats, OrderStatus,
    StatusUpdateRequest,
};

use crate::core::ServerState;
use crate::orders::TicketSlot;
use crate::utils::time::parse_date;

/// Query params for listing orders
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// YYYY-MM-DD, defaults to the current business date
    pub date: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CursorResetRequest {
    pub date: Option<String>,
    /// Ticket to hand out next, e.g. `C1`
    pub next: String,
}

#[derive(Debug, Serialize)]
pub struct CursorInfo {
    pub date: chrono::NaiveDate,
    pub next: String,
}

fn resolve_date(state: &ServerState, date: Option<&str>) -> AppResult<chrono::NaiveDate> {
    match date {
        Some(d) => parse_date(d),
        None => Ok(state.order_service().today()),
    }
}

/// Checkout
pub async fn checkout(
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<ApiResponse<CheckoutReceipt>> {
    let receipt = state
        .order_service()
        .checkout(&payload.order_details)
        .await?;
    Ok(ApiResponse::success(receipt))
}

/// List unit orders of a business date
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Vec<NormalizedUnitOrder>>> {
    let date = resolve_date(&state, query.date.as_deref())?;
    let status = match query.status.as_deref() {
        Some(code) => Some(
            OrderStatus::from_code(code.trim())
                .ok_or_else(|| AppError::validation(format!("Unknown order status: {}", code)))?,
        ),
        None => None,
    };
    let orders = state.order_service().list_orders(date, status).await?;
    Ok(ApiResponse::success(orders))
}

/// Per-status counts (dashboard)
pub async fn stats(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<ApiResponse<OrderStats>> {
    let date = resolve_date(&state, query.date.as_deref())?;
    let stats = state.order_service().stats(date).await?;
    Ok(ApiResponse::success(stats))
}

/// Get unit order by order number
pub async fn get_by_number(
    State(state): State<ServerState>,
    Path(order_number): Path<String>,
) -> AppResult<ApiResponse<NormalizedUnitOrder>> {
    let order = state.order_service().get_order(&order_number).await?;
    Ok(ApiResponse::success(order))
}

/// Move a unit order to a new status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(order_number): Path<String>,
    Json(payload): Json<StatusUpdateRequest>,
) -> AppResult<ApiResponse<NormalizedUnitOrder>> {
    let order = state
        .order_service()
        .update_status(&order_number, payload.status)
        .await?;
    Ok(ApiResponse::success(order))
}

/// Next ticket of a business date
pub async fn cursor(
    State(state): State<ServerState>,
    Query(query): Query<StatsQuery>,
) -> AppResult<ApiResponse<CursorInfo>> {
    let date = resolve_date(&state, query.date.as_deref())?;
    let next = state.order_service().cursor(date).await?;
    Ok(ApiResponse::success(CursorInfo {
        date,
        next: next.to_string(),
    }))
}

/// Reposition the day cursor
pub async fn reset_cursor(
    State(state): State<ServerState>,
    Json(payload): Json<CursorResetRequest>,
) -> AppResult<ApiResponse<CursorInfo>> {
    let date = resolve_date(&state, payload.date.as_deref())?;
    let next = TicketSlot::parse(payload.next.trim())
        .ok_or_else(|| AppError::validation(format!("Invalid ticket: {}", payload.next)))?;
    state.order_service().reset_cursor(date, next).await?;
    Ok(ApiResponse::success(CursorInfo {
        date,
        next: next.to_string(),
    }))
}
