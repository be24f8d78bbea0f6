//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableUpdate, TableStatus};
use sqlx::{Executor, Sqlite, SqlitePool};

const COLUMNS: &str = "id, capacity, status, needs_waiter, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<DiningTable>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let table = sqlx::query_as::<_, DiningTable>(&format!(
        "SELECT {COLUMNS} FROM dining_table WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;
    Ok(table)
}

/// Seed helper: insert a table if the number is free
pub async fn insert_if_missing(pool: &SqlitePool, id: i64, capacity: i32) -> RepoResult<bool> {
    let rows = sqlx::query(
        "INSERT OR IGNORE INTO dining_table (id, capacity, status, needs_waiter, updated_at) VALUES (?1, ?2, 'available', 0, ?3)",
    )
    .bind(id)
    .bind(capacity)
    .bind(shared::util::now_millis())
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Partial update of occupancy / attention flag
pub async fn update(pool: &SqlitePool, id: i64, data: DiningTableUpdate) -> RepoResult<DiningTable> {
    let rows = sqlx::query(
        "UPDATE dining_table SET status = COALESCE(?1, status), needs_waiter = COALESCE(?2, needs_waiter), updated_at = ?3 WHERE id = ?4",
    )
    .bind(data.status)
    .bind(data.needs_waiter)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

/// Set only the attention flag; occupancy is left as is
pub async fn set_needs_waiter(
    pool: &SqlitePool,
    id: i64,
    needs_waiter: bool,
) -> RepoResult<DiningTable> {
    update(
        pool,
        id,
        DiningTableUpdate {
            status: None,
            needs_waiter: Some(needs_waiter),
        },
    )
    .await
}

/// 结账后复位：空闲 + 清除呼叫标记
pub async fn reset_after_settlement<'e, E>(executor: E, id: i64, now: i64) -> RepoResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(
        "UPDATE dining_table SET status = ?1, needs_waiter = 0, updated_at = ?2 WHERE id = ?3",
    )
    .bind(TableStatus::Available)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(rows.rows_affected())
}
