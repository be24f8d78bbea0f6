//! Inventory Repository

use super::{RepoError, RepoResult};
use shared::models::{InventoryItem, InventoryItemCreate, InventoryItemUpdate, MissingIngredient};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, description, quantity, unit, minimum_quantity, (quantity < minimum_quantity) AS low_stock, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<InventoryItem>> {
    let items = sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {COLUMNS} FROM inventory_item ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<InventoryItem>> {
    let item = sqlx::query_as::<_, InventoryItem>(&format!(
        "SELECT {COLUMNS} FROM inventory_item WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(item)
}

pub async fn create(pool: &SqlitePool, data: InventoryItemCreate) -> RepoResult<InventoryItem> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO inventory_item (name, description, quantity, unit, minimum_quantity, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(data.description)
    .bind(data.quantity)
    .bind(data.unit.trim())
    .bind(data.minimum_quantity)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create inventory item".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: InventoryItemUpdate,
) -> RepoResult<InventoryItem> {
    let rows = sqlx::query(
        "UPDATE inventory_item SET name = COALESCE(?1, name), description = COALESCE(?2, description), quantity = COALESCE(?3, quantity), unit = COALESCE(?4, unit), minimum_quantity = COALESCE(?5, minimum_quantity), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description)
    .bind(data.quantity)
    .bind(data.unit.as_deref().map(str::trim))
    .bind(data.minimum_quantity)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Inventory item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Inventory item {id} not found")))
}

/// Delete an inventory item; its ingredient requirements cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM inventory_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Ingredients of a menu item whose stock is below one portion
pub async fn find_missing_for_menu_item(
    pool: &SqlitePool,
    menu_item_id: i64,
) -> RepoResult<Vec<MissingIngredient>> {
    let missing = sqlx::query_as::<_, MissingIngredient>(
        "SELECT i.id AS inventory_item_id, i.name, r.quantity_required AS required, i.quantity AS available, r.unit \
         FROM menu_item_ingredient r JOIN inventory_item i ON i.id = r.inventory_item_id \
         WHERE r.menu_item_id = ? AND i.quantity < r.quantity_required \
         ORDER BY i.name",
    )
    .bind(menu_item_id)
    .fetch_all(pool)
    .await?;
    Ok(missing)
}
