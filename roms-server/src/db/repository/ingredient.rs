//! Menu Item Ingredient Repository
//!
//! Links a menu item to the inventory it consumes per portion.

use super::{RepoError, RepoResult};
use shared::models::{Ingredient, IngredientCreate, IngredientUpdate};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT r.menu_item_id, r.inventory_item_id, i.name AS inventory_name, r.quantity_required, r.unit \
     FROM menu_item_ingredient r JOIN inventory_item i ON i.id = r.inventory_item_id";

pub async fn find_by_menu_item(pool: &SqlitePool, menu_item_id: i64) -> RepoResult<Vec<Ingredient>> {
    let rows = sqlx::query_as::<_, Ingredient>(&format!(
        "{SELECT} WHERE r.menu_item_id = ? ORDER BY i.name"
    ))
    .bind(menu_item_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_one(
    pool: &SqlitePool,
    menu_item_id: i64,
    inventory_item_id: i64,
) -> RepoResult<Option<Ingredient>> {
    let row = sqlx::query_as::<_, Ingredient>(&format!(
        "{SELECT} WHERE r.menu_item_id = ?1 AND r.inventory_item_id = ?2"
    ))
    .bind(menu_item_id)
    .bind(inventory_item_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Unit defaults to the inventory item's unit
pub async fn create(
    pool: &SqlitePool,
    menu_item_id: i64,
    data: IngredientCreate,
) -> RepoResult<Ingredient> {
    sqlx::query(
        "INSERT INTO menu_item_ingredient (menu_item_id, inventory_item_id, quantity_required, unit) \
         SELECT ?1, id, ?2, COALESCE(?3, unit) FROM inventory_item WHERE id = ?4",
    )
    .bind(menu_item_id)
    .bind(data.quantity_required)
    .bind(data.unit)
    .bind(data.inventory_item_id)
    .execute(pool)
    .await?;
    find_one(pool, menu_item_id, data.inventory_item_id)
        .await?
        .ok_or_else(|| {
            RepoError::NotFound(format!(
                "Inventory item {} not found",
                data.inventory_item_id
            ))
        })
}

pub async fn update(
    pool: &SqlitePool,
    menu_item_id: i64,
    inventory_item_id: i64,
    data: IngredientUpdate,
) -> RepoResult<Ingredient> {
    let rows = sqlx::query(
        "UPDATE menu_item_ingredient SET quantity_required = COALESCE(?1, quantity_required), unit = COALESCE(?2, unit) \
         WHERE menu_item_id = ?3 AND inventory_item_id = ?4",
    )
    .bind(data.quantity_required)
    .bind(data.unit)
    .bind(menu_item_id)
    .bind(inventory_item_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Ingredient {inventory_item_id} of menu item {menu_item_id} not found"
        )));
    }
    find_one(pool, menu_item_id, inventory_item_id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Ingredient not found".into()))
}

pub async fn delete(pool: &SqlitePool, menu_item_id: i64, inventory_item_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "DELETE FROM menu_item_ingredient WHERE menu_item_id = ?1 AND inventory_item_id = ?2",
    )
    .bind(menu_item_id)
    .bind(inventory_item_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{inventory, menu_item};
    use shared::models::InventoryItemCreate;

    async fn setup() -> (DbService, i64, i64) {
        let db = DbService::open_in_memory().await.unwrap();
        menu_item::insert_if_missing(&db.pool, "Margherita Pizza", "", 12.99, "Main Course")
            .await
            .unwrap();
        let pizza = menu_item::find_all(&db.pool).await.unwrap()[0].id;
        let cheese = inventory::create(
            &db.pool,
            InventoryItemCreate {
                name: "Mozzarella".into(),
                description: None,
                quantity: 3.0,
                unit: "kg".into(),
                minimum_quantity: 1.0,
            },
        )
        .await
        .unwrap()
        .id;
        (db, pizza, cheese)
    }

    #[tokio::test]
    async fn test_unit_defaults_to_inventory_unit() {
        let (db, pizza, cheese) = setup().await;
        let ingredient = create(
            &db.pool,
            pizza,
            IngredientCreate {
                inventory_item_id: cheese,
                quantity_required: 0.2,
                unit: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(ingredient.unit, "kg");
        assert_eq!(ingredient.inventory_name, "Mozzarella");
    }

    #[tokio::test]
    async fn test_duplicate_link_is_rejected() {
        let (db, pizza, cheese) = setup().await;
        let data = IngredientCreate {
            inventory_item_id: cheese,
            quantity_required: 0.2,
            unit: None,
        };
        create(&db.pool, pizza, data.clone()).await.unwrap();
        let err = create(&db.pool, pizza, data).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_unknown_inventory_item() {
        let (db, pizza, _) = setup().await;
        let err = create(
            &db.pool,
            pizza,
            IngredientCreate {
                inventory_item_id: 999,
                quantity_required: 1.0,
                unit: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_deleting_inventory_cascades() {
        let (db, pizza, cheese) = setup().await;
        create(
            &db.pool,
            pizza,
            IngredientCreate {
                inventory_item_id: cheese,
                quantity_required: 0.2,
                unit: None,
            },
        )
        .await
        .unwrap();
        assert!(inventory::delete(&db.pool, cheese).await.unwrap());
        assert!(find_by_menu_item(&db.pool, pizza).await.unwrap().is_empty());
    }
}
