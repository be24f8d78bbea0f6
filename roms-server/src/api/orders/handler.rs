//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use shared::models::{Order, OrderCreate, OrderStatusUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// Number of orders removed by a clear operation
#[derive(Debug, Serialize)]
pub struct ClearedOrders {
    pub removed: u64,
}

/// POST /api/orders - 顾客下单 (价格快照)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = state.orders.create_order(payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders - 所有未结账订单，最新在前
pub async fn list_active(
    State(state): State<ServerState>,
    _current: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list_active().await?))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    _current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get_order(id).await?))
}

/// GET /api/orders/table/{table_id} - 顾客轮询本桌订单
pub async fn list_for_table(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.list_for_table(table_id).await?))
}

/// PATCH /api/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.transition(id, payload, &current).await?))
}

/// DELETE /api/orders/table/{table_id}
pub async fn clear_table(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(table_id): Path<i64>,
) -> AppResult<Json<ClearedOrders>> {
    let removed = state.orders.clear_table(table_id).await?;
    tracing::info!(table_id, removed, user_id = current.id, "Orders cleared for table");
    Ok(Json(ClearedOrders { removed }))
}

/// DELETE /api/orders - 全部清空 (演示重置)
pub async fn clear_all(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ClearedOrders>> {
    let removed = state.orders.clear_all().await?;
    tracing::warn!(removed, user_id = current.id, "All orders cleared");
    Ok(Json(ClearedOrders { removed }))
}
