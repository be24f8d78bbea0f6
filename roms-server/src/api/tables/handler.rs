//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::models::{CallWaiterRequest, DiningTable, DiningTableUpdate, SettleRequest, Settlement};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/tables - 获取所有桌台
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    Ok(Json(state.tables.list_tables().await?))
}

/// POST /api/tables/{id}/call-waiter - 顾客呼叫服务员，不改变占用状态
///
/// Body is optional; an empty body means a generic attention call.
pub async fn call_waiter(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    payload: Option<Json<CallWaiterRequest>>,
) -> AppResult<Json<DiningTable>> {
    let reason = payload.map(|Json(p)| p.reason).unwrap_or_default();
    Ok(Json(state.tables.call_waiter(id, reason).await?))
}

/// PATCH /api/tables/{id} - 更新占用状态 / 呼叫标记
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.update_table(id, payload).await?))
}

/// POST /api/tables/{id}/attend - 服务员已到场处理
pub async fn attend(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DiningTable>> {
    Ok(Json(state.tables.attend(id).await?))
}

/// POST /api/tables/{id}/settle - 结清该桌所有未付订单并释放桌台
pub async fn settle(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    payload: Option<Json<SettleRequest>>,
) -> AppResult<Json<Settlement>> {
    let payment_method = payload.and_then(|Json(p)| p.payment_method);
    let settlement = state.orders.settle_table(id, payment_method).await?;
    tracing::info!(
        table_id = id,
        orders_settled = settlement.orders_settled,
        user_id = current.id,
        "Settlement recorded"
    );
    Ok(Json(settlement))
}
