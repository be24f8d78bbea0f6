//! Feedback Repository

use super::{RepoError, RepoResult};
use shared::models::{Feedback, FeedbackCreate};
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Feedback>> {
    let rows = sqlx::query_as::<_, Feedback>(
        "SELECT id, table_id, rating, comment, created_at FROM feedback ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_table(pool: &SqlitePool, table_id: i64) -> RepoResult<Vec<Feedback>> {
    let rows = sqlx::query_as::<_, Feedback>(
        "SELECT id, table_id, rating, comment, created_at FROM feedback WHERE table_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(table_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, data: FeedbackCreate) -> RepoResult<Feedback> {
    let row = sqlx::query_as::<_, Feedback>(
        "INSERT INTO feedback (table_id, rating, comment, created_at) VALUES (?1, ?2, ?3, ?4) \
         RETURNING id, table_id, rating, comment, created_at",
    )
    .bind(data.table_id)
    .bind(data.rating)
    .bind(data.comment.as_deref().map(str::trim).filter(|c| !c.is_empty()))
    .bind(shared::util::now_millis())
    .fetch_optional(pool)
    .await?;
    row.ok_or_else(|| RepoError::Database("Failed to create feedback".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::dining_table;

    #[tokio::test]
    async fn test_blank_comment_is_stored_as_none() {
        let db = DbService::open_in_memory().await.unwrap();
        dining_table::insert_if_missing(&db.pool, 3, 4).await.unwrap();
        let fb = create(
            &db.pool,
            FeedbackCreate {
                table_id: 3,
                rating: 5,
                comment: Some("   ".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(fb.rating, 5);
        assert!(fb.comment.is_none());
        assert_eq!(find_all(&db.pool).await.unwrap().len(), 1);
        assert_eq!(find_by_table(&db.pool, 3).await.unwrap().len(), 1);
        assert!(find_by_table(&db.pool, 4).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_table_violates_reference() {
        let db = DbService::open_in_memory().await.unwrap();
        let err = create(
            &db.pool,
            FeedbackCreate {
                table_id: 42,
                rating: 4,
                comment: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
