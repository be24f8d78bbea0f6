//! Inventory API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{AvailabilityCheck, InventoryItem, InventoryItemCreate, InventoryItemUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, inventory, menu_item};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

fn inventory_not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::InventoryItemNotFound,
        format!("Inventory item {id} not found"),
    )
    .with_detail("inventory_item_id", id)
}

fn check_quantity(field: &'static str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::new(ErrorCode::InventoryInvalidQuantity).with_detail(field, value));
    }
    Ok(())
}

fn map_write_error(name: Option<&str>) -> impl FnOnce(RepoError) -> AppError + '_ {
    move |e| match e {
        RepoError::Duplicate(_) => {
            AppError::new(ErrorCode::InventoryNameExists).with_detail("name", name.unwrap_or_default())
        }
        other => other.into(),
    }
}

/// GET /api/inventory - 按名称排序，附带 low_stock 标记
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<InventoryItem>>> {
    Ok(Json(inventory::find_all(&state.db.pool).await?))
}

/// POST /api/inventory
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<InventoryItemCreate>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    required_text(&payload.name, "name", MAX_NAME_LEN)?;
    required_text(&payload.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    check_quantity("quantity", payload.quantity)?;
    check_quantity("minimum_quantity", payload.minimum_quantity)?;

    let name = payload.name.trim().to_string();
    let item = inventory::create(&state.db.pool, payload)
        .await
        .map_err(map_write_error(Some(&name)))?;

    tracing::info!(inventory_item_id = item.id, name = %item.name, "Inventory item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/inventory/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<InventoryItemUpdate>,
) -> AppResult<Json<InventoryItem>> {
    if let Some(name) = &payload.name {
        required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(unit) = &payload.unit {
        required_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(quantity) = payload.quantity {
        check_quantity("quantity", quantity)?;
    }
    if let Some(minimum) = payload.minimum_quantity {
        check_quantity("minimum_quantity", minimum)?;
    }

    let name = payload.name.clone();
    let item = inventory::update(&state.db.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => inventory_not_found(id),
            other => map_write_error(name.as_deref())(other),
        })?;

    if item.low_stock {
        tracing::warn!(inventory_item_id = id, name = %item.name, quantity = item.quantity, "Inventory below minimum");
    }
    Ok(Json(item))
}

/// DELETE /api/inventory/{id} - 相关配料需求级联删除
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if !inventory::delete(&state.db.pool, id).await? {
        return Err(inventory_not_found(id));
    }
    tracing::info!(inventory_item_id = id, "Inventory item deleted");
    Ok(ApiResponse::ok())
}

/// GET /api/inventory/check/{menu_item_id}
///
/// Advisory only: order placement never consults it.
pub async fn check(
    State(state): State<ServerState>,
    Path(menu_item_id): Path<i64>,
) -> AppResult<Json<AvailabilityCheck>> {
    if menu_item::find_by_id(&state.db.pool, menu_item_id)
        .await?
        .is_none()
    {
        return Err(AppError::with_message(
            ErrorCode::MenuItemNotFound,
            format!("Menu item {menu_item_id} not found"),
        )
        .with_detail("menu_item_id", menu_item_id));
    }

    let missing = inventory::find_missing_for_menu_item(&state.db.pool, menu_item_id).await?;
    Ok(Json(AvailabilityCheck {
        menu_item_id,
        can_order: missing.is_empty(),
        missing_ingredients: missing,
    }))
}
