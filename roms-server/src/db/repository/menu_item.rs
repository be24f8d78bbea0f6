//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use sqlx::{Executor, Sqlite, SqlitePool};

const COLUMNS: &str = "id, name, description, price, category, image_url, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuItem>> {
    let items = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item ORDER BY category, name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(items)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<MenuItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let item = sqlx::query_as::<_, MenuItem>(&format!(
        "SELECT {COLUMNS} FROM menu_item WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(item)
}

/// Current price, read inside the order transaction
pub async fn find_price<'e, E>(executor: E, id: i64) -> RepoResult<Option<f64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let price = sqlx::query_scalar::<_, f64>("SELECT price FROM menu_item WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(price)
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO menu_item (name, description, price, category, image_url, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id",
    )
    .bind(data.name.trim())
    .bind(data.description)
    .bind(data.price)
    .bind(data.category.trim())
    .bind(data.image_url)
    .bind(now)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

/// Seed helper: insert by name if absent
pub async fn insert_if_missing(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    price: f64,
    category: &str,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "INSERT OR IGNORE INTO menu_item (name, description, price, category, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(category)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn update(pool: &SqlitePool, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
    let rows = sqlx::query(
        "UPDATE menu_item SET name = COALESCE(?1, name), description = COALESCE(?2, description), price = COALESCE(?3, price), category = COALESCE(?4, category), image_url = COALESCE(?5, image_url), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.description)
    .bind(data.price)
    .bind(data.category.as_deref().map(str::trim))
    .bind(data.image_url)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Number of order lines that reference the item
pub async fn count_order_lines(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_item WHERE menu_item_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM menu_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn pizza() -> MenuItemCreate {
        MenuItemCreate {
            name: "Margherita Pizza".into(),
            description: Some("Classic".into()),
            price: 12.99,
            category: "Main Course".into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_name_is_rejected() {
        let db = DbService::open_in_memory().await.unwrap();
        create(&db.pool, pizza()).await.unwrap();
        let err = create(&db.pool, pizza()).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = DbService::open_in_memory().await.unwrap();
        let item = create(&db.pool, pizza()).await.unwrap();

        let updated = update(
            &db.pool,
            item.id,
            MenuItemUpdate {
                price: Some(14.5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 14.5);
        assert_eq!(updated.name, "Margherita Pizza");
        assert_eq!(updated.category, "Main Course");
        assert_eq!(find_price(&db.pool, item.id).await.unwrap(), Some(14.5));
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_category_then_name() {
        let db = DbService::open_in_memory().await.unwrap();
        insert_if_missing(&db.pool, "Zucchini Soup", "", 5.0, "Starters").await.unwrap();
        insert_if_missing(&db.pool, "Caesar Salad", "", 8.99, "Starters").await.unwrap();
        insert_if_missing(&db.pool, "Margherita Pizza", "", 12.99, "Main Course").await.unwrap();

        let names: Vec<String> = find_all(&db.pool).await.unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, ["Margherita Pizza", "Caesar Salad", "Zucchini Soup"]);
    }
}
