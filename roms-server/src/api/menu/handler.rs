//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{
    Ingredient, IngredientCreate, IngredientUpdate, MenuItem, MenuItemCreate, MenuItemUpdate,
};

use crate::core::ServerState;
use crate::db::repository::{RepoError, ingredient, inventory, menu_item};
use crate::money;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

fn menu_item_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
        .with_detail("menu_item_id", id)
}

fn name_exists(name: &str) -> AppError {
    AppError::new(ErrorCode::MenuItemNameExists).with_detail("name", name)
}

fn validate_price(price: f64) -> AppResult<()> {
    if !money::is_valid_price(price) {
        return Err(AppError::new(ErrorCode::MenuItemInvalidPrice).with_detail("price", price));
    }
    Ok(())
}

fn validate_quantity_required(quantity: f64) -> AppResult<()> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(AppError::validation("Required quantity must be greater than zero")
            .with_detail("quantity_required", quantity));
    }
    Ok(())
}

async fn ensure_menu_item(state: &ServerState, id: i64) -> AppResult<()> {
    menu_item::find_by_id(&state.db.pool, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| menu_item_not_found(id))
}

// ========== Menu items ==========

/// GET /api/menu - 按分类、名称排序
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(menu_item::find_all(&state.db.pool).await?))
}

/// GET /api/menu/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    let item = menu_item::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| menu_item_not_found(id))?;
    Ok(Json(item))
}

/// POST /api/menu
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    required_text(&payload.name, "name", MAX_NAME_LEN)?;
    required_text(&payload.category, "category", MAX_NAME_LEN)?;
    validate_price(payload.price)?;

    let name = payload.name.trim().to_string();
    let item = menu_item::create(&state.db.pool, payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => name_exists(&name),
            other => other.into(),
        })?;

    tracing::info!(menu_item_id = item.id, name = %item.name, price = item.price, "Menu item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/menu/{id}
///
/// Price edits never touch existing order lines; those keep their snapshot.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    if let Some(name) = &payload.name {
        required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(category) = &payload.category {
        required_text(category, "category", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
    }

    let name = payload.name.as_deref().map(str::trim).unwrap_or_default().to_string();
    let item = menu_item::update(&state.db.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => menu_item_not_found(id),
            RepoError::Duplicate(_) => name_exists(&name),
            other => other.into(),
        })?;

    tracing::info!(menu_item_id = id, price = item.price, "Menu item updated");
    Ok(Json(item))
}

/// DELETE /api/menu/{id} - 被订单引用的菜品不可删除
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    ensure_menu_item(&state, id).await?;

    let lines = menu_item::count_order_lines(&state.db.pool, id).await?;
    if lines > 0 {
        return Err(AppError::new(ErrorCode::MenuItemInUse)
            .with_detail("menu_item_id", id)
            .with_detail("order_lines", lines));
    }

    let deleted = menu_item::delete(&state.db.pool, id)
        .await
        .map_err(|e| match e {
            // 检查之后恰好有新订单引用
            RepoError::Validation(_) => AppError::new(ErrorCode::MenuItemInUse).with_detail("menu_item_id", id),
            other => other.into(),
        })?;
    if !deleted {
        return Err(menu_item_not_found(id));
    }

    tracing::info!(menu_item_id = id, "Menu item deleted");
    Ok(ApiResponse::ok())
}

// ========== Ingredient requirements ==========

/// GET /api/menu/{id}/ingredients
pub async fn list_ingredients(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Ingredient>>> {
    ensure_menu_item(&state, id).await?;
    Ok(Json(ingredient::find_by_menu_item(&state.db.pool, id).await?))
}

/// POST /api/menu/{id}/ingredients
pub async fn add_ingredient(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<IngredientCreate>,
) -> AppResult<(StatusCode, Json<Ingredient>)> {
    validate_quantity_required(payload.quantity_required)?;
    ensure_menu_item(&state, id).await?;

    let inventory_item_id = payload.inventory_item_id;
    if inventory::find_by_id(&state.db.pool, inventory_item_id)
        .await?
        .is_none()
    {
        return Err(AppError::new(ErrorCode::InventoryItemNotFound)
            .with_detail("inventory_item_id", inventory_item_id));
    }

    let added = ingredient::create(&state.db.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::IngredientAlreadyAdded)
                .with_detail("menu_item_id", id)
                .with_detail("inventory_item_id", inventory_item_id),
            RepoError::NotFound(_) => AppError::new(ErrorCode::InventoryItemNotFound)
                .with_detail("inventory_item_id", inventory_item_id),
            other => other.into(),
        })?;

    tracing::info!(menu_item_id = id, inventory_item_id, "Ingredient requirement added");
    Ok((StatusCode::CREATED, Json(added)))
}

/// PUT /api/menu/{id}/ingredients/{inventory_id}
pub async fn update_ingredient(
    State(state): State<ServerState>,
    Path((id, inventory_id)): Path<(i64, i64)>,
    Json(payload): Json<IngredientUpdate>,
) -> AppResult<Json<Ingredient>> {
    if let Some(quantity) = payload.quantity_required {
        validate_quantity_required(quantity)?;
    }
    if let Some(unit) = &payload.unit {
        required_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
    }

    let updated = ingredient::update(&state.db.pool, id, inventory_id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => ingredient_not_found(id, inventory_id),
            other => other.into(),
        })?;
    Ok(Json(updated))
}

/// DELETE /api/menu/{id}/ingredients/{inventory_id}
pub async fn remove_ingredient(
    State(state): State<ServerState>,
    Path((id, inventory_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    if !ingredient::delete(&state.db.pool, id, inventory_id).await? {
        return Err(ingredient_not_found(id, inventory_id));
    }
    tracing::info!(menu_item_id = id, inventory_item_id = inventory_id, "Ingredient requirement removed");
    Ok(ApiResponse::ok())
}

fn ingredient_not_found(menu_item_id: i64, inventory_item_id: i64) -> AppError {
    AppError::new(ErrorCode::IngredientNotFound)
        .with_detail("menu_item_id", menu_item_id)
        .with_detail("inventory_item_id", inventory_item_id)
}
