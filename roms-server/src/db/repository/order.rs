//! Order Repository
//!
//! Orders live in `customer_order`, their lines in `order_item`. Reads hydrate
//! lines with the menu item name; writes that span several rows take an
//! executor so the engine can run them inside one transaction.

use super::RepoResult;
use shared::models::{Order, OrderLine, OrderStatus, PaymentMethod};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

const COLUMNS: &str =
    "id, table_id, status, total_amount, version, payment_method, created_at, updated_at, paid_at";

const LINE_SELECT: &str = "SELECT l.id, l.order_id, l.menu_item_id, m.name AS menu_item_name, l.quantity, l.price_at_time \
     FROM order_item l JOIN menu_item m ON m.id = l.menu_item_id";

// ========== Reads ==========

/// Order row without lines
pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM customer_order WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(order)
}

/// Order with its lines
pub async fn find_hydrated(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let mut orders = hydrate(pool, vec![order]).await?;
    Ok(orders.pop())
}

/// 未结账订单，最新的在前
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM customer_order WHERE status <> ?1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(OrderStatus::Paid)
    .fetch_all(pool)
    .await?;
    hydrate(pool, orders).await
}

/// Unsettled orders of one table, newest first
pub async fn find_active_by_table(pool: &SqlitePool, table_id: i64) -> RepoResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM customer_order WHERE table_id = ?1 AND status <> ?2 ORDER BY created_at DESC, id DESC"
    ))
    .bind(table_id)
    .bind(OrderStatus::Paid)
    .fetch_all(pool)
    .await?;
    hydrate(pool, orders).await
}

/// Attach lines to each order with a single `IN (...)` query
async fn hydrate(pool: &SqlitePool, mut orders: Vec<Order>) -> RepoResult<Vec<Order>> {
    if orders.is_empty() {
        return Ok(orders);
    }

    let mut qb = QueryBuilder::<Sqlite>::new(LINE_SELECT);
    qb.push(" WHERE l.order_id IN (");
    let mut ids = qb.separated(", ");
    for order in &orders {
        ids.push_bind(order.id);
    }
    qb.push(") ORDER BY l.order_id, l.id");

    let lines = qb.build_query_as::<OrderLine>().fetch_all(pool).await?;

    let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for line in lines {
        by_order.entry(line.order_id).or_default().push(line);
    }
    for order in &mut orders {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(orders)
}

// ========== Writes ==========

/// Insert the order header in `pending`; returns the new id
pub async fn insert<'e, E>(executor: E, table_id: i64, total_amount: f64, now: i64) -> RepoResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO customer_order (table_id, status, total_amount, version, created_at, updated_at) \
         VALUES (?1, ?2, ?3, 1, ?4, ?4) RETURNING id",
    )
    .bind(table_id)
    .bind(OrderStatus::Pending)
    .bind(total_amount)
    .bind(now)
    .fetch_one(executor)
    .await?;
    Ok(id)
}

/// Insert one line with its frozen price
pub async fn insert_line<'e, E>(
    executor: E,
    order_id: i64,
    menu_item_id: i64,
    quantity: i32,
    price_at_time: f64,
) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO order_item (order_id, menu_item_id, quantity, price_at_time) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(order_id)
    .bind(menu_item_id)
    .bind(quantity)
    .bind(price_at_time)
    .execute(executor)
    .await?;
    Ok(())
}

/// Compare-and-swap the status on `(id, version)`
///
/// Returns `false` when the row moved on (or vanished) since it was read.
pub async fn update_status_if_version(
    pool: &SqlitePool,
    id: i64,
    status: OrderStatus,
    version: i64,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE customer_order SET status = ?1, version = version + 1, updated_at = ?2, \
         paid_at = CASE WHEN ?1 = ?5 THEN ?2 ELSE paid_at END \
         WHERE id = ?3 AND version = ?4 AND status <> ?5",
    )
    .bind(status)
    .bind(now)
    .bind(id)
    .bind(version)
    .bind(OrderStatus::Paid)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// 将该桌所有未结账订单标记为已付款，返回受影响行数
pub async fn settle_by_table<'e, E>(
    executor: E,
    table_id: i64,
    payment_method: Option<PaymentMethod>,
    now: i64,
) -> RepoResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "UPDATE customer_order SET status = ?1, payment_method = ?2, paid_at = ?3, updated_at = ?3, version = version + 1 \
         WHERE table_id = ?4 AND status <> ?1",
    )
    .bind(OrderStatus::Paid)
    .bind(payment_method)
    .bind(now)
    .bind(table_id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected())
}

/// Delete lines, then orders, of one table; returns the number of orders removed
pub async fn delete_by_table(pool: &SqlitePool, table_id: i64) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "DELETE FROM order_item WHERE order_id IN (SELECT id FROM customer_order WHERE table_id = ?)",
    )
    .bind(table_id)
    .execute(&mut *tx)
    .await?;
    let rows = sqlx::query("DELETE FROM customer_order WHERE table_id = ?")
        .bind(table_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(rows.rows_affected())
}

/// Wipe every order and line
pub async fn delete_all(pool: &SqlitePool) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM order_item").execute(&mut *tx).await?;
    let rows = sqlx::query("DELETE FROM customer_order")
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(rows.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{dining_table, menu_item};

    async fn setup() -> (DbService, i64) {
        let db = DbService::open_in_memory().await.unwrap();
        dining_table::insert_if_missing(&db.pool, 4, 4).await.unwrap();
        menu_item::insert_if_missing(&db.pool, "Soup", "", 5.0, "Starters")
            .await
            .unwrap();
        let soup = menu_item::find_all(&db.pool).await.unwrap()[0].id;
        (db, soup)
    }

    async fn place(db: &DbService, table_id: i64, soup: i64, now: i64) -> i64 {
        let mut tx = db.pool.begin().await.unwrap();
        let id = insert(&mut *tx, table_id, 10.0, now).await.unwrap();
        insert_line(&mut *tx, id, soup, 2, 5.0).await.unwrap();
        tx.commit().await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_hydrated_order_carries_item_names() {
        let (db, soup) = setup().await;
        let id = place(&db, 4, soup, 1).await;

        let order = find_hydrated(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.version, 1);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].menu_item_name, "Soup");
        assert_eq!(order.items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_active_orders_newest_first() {
        let (db, soup) = setup().await;
        let first = place(&db, 4, soup, 100).await;
        let second = place(&db, 4, soup, 200).await;

        let ids: Vec<i64> = find_active(&db.pool).await.unwrap().iter().map(|o| o.id).collect();
        assert_eq!(ids, [second, first]);
    }

    #[tokio::test]
    async fn test_version_cas() {
        let (db, soup) = setup().await;
        let id = place(&db, 4, soup, 1).await;

        assert!(update_status_if_version(&db.pool, id, OrderStatus::Preparing, 1, 2).await.unwrap());
        // 旧版本号不再生效
        assert!(!update_status_if_version(&db.pool, id, OrderStatus::Ready, 1, 3).await.unwrap());

        let order = find_by_id(&db.pool, id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
        assert_eq!(order.version, 2);
    }

    #[tokio::test]
    async fn test_settle_marks_only_unsettled() {
        let (db, soup) = setup().await;
        place(&db, 4, soup, 1).await;
        place(&db, 4, soup, 2).await;

        let settled = settle_by_table(&db.pool, 4, Some(PaymentMethod::Cash), 3).await.unwrap();
        assert_eq!(settled, 2);
        assert!(find_active_by_table(&db.pool, 4).await.unwrap().is_empty());

        let again = settle_by_table(&db.pool, 4, None, 4).await.unwrap();
        assert_eq!(again, 0);
    }

    #[tokio::test]
    async fn test_delete_by_table_removes_lines() {
        let (db, soup) = setup().await;
        place(&db, 4, soup, 1).await;

        assert_eq!(delete_by_table(&db.pool, 4).await.unwrap(), 1);
        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_item")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(lines, 0);
        let orders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer_order")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(orders, 0);
    }
}
