//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, username, email, role, created_at";

/// 含密码哈希的完整记录，仅用于登录校验
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: i64,
    pub password_hash: String,
}

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        Self {
            id: r.id,
            username: r.username,
            email: r.email,
            role: r.role,
            created_at: r.created_at,
        }
    }
}

/// Fields a staff update may change; `password_hash` is already hashed
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// Waiter and kitchen accounts, admins excluded
pub async fn find_staff(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM user WHERE role <> 'admin' ORDER BY username"
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM user WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_record_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<UserRecord>> {
    let record = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {COLUMNS}, password_hash FROM user WHERE email = ? COLLATE NOCASE"
    ))
    .bind(email.trim())
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn exists_by_username(pool: &SqlitePool, username: &str) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn exists_by_email(pool: &SqlitePool, email: &str) -> RepoResult<bool> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user WHERE email = ? COLLATE NOCASE")
            .bind(email)
            .fetch_one(pool)
            .await?;
    Ok(count > 0)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO user (username, email, password_hash, role, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5) RETURNING {COLUMNS}"
    ))
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .bind(now)
    .fetch_optional(pool)
    .await?;
    user.ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: UserChanges) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE user SET username = COALESCE(?1, username), email = COALESCE(?2, email), password_hash = COALESCE(?3, password_hash), role = COALESCE(?4, role), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.username)
    .bind(data.email)
    .bind(data.password_hash)
    .bind(data.role)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM user WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_email_lookup_ignores_case() {
        let db = DbService::open_in_memory().await.unwrap();
        create(&db.pool, "anna", "Anna@Example.com", "hash", Role::Waiter)
            .await
            .unwrap();

        let record = find_record_by_email(&db.pool, "anna@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.role, Role::Waiter);
        assert_eq!(record.password_hash, "hash");
        assert!(exists_by_email(&db.pool, "ANNA@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let db = DbService::open_in_memory().await.unwrap();
        create(&db.pool, "chef", "a@x.io", "h", Role::KitchenStaff)
            .await
            .unwrap();
        let err = create(&db.pool, "chef", "b@x.io", "h", Role::KitchenStaff)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_update_role() {
        let db = DbService::open_in_memory().await.unwrap();
        let user = create(&db.pool, "sam", "sam@x.io", "h", Role::Waiter)
            .await
            .unwrap();
        let user = update(
            &db.pool,
            user.id,
            UserChanges {
                role: Some(Role::KitchenStaff),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(user.role, Role::KitchenStaff);
        assert_eq!(user.username, "sam");
    }

    #[tokio::test]
    async fn test_staff_list_excludes_admins() {
        let db = DbService::open_in_memory().await.unwrap();
        create(&db.pool, "root", "root@x.io", "h", Role::Admin).await.unwrap();
        create(&db.pool, "zoe", "zoe@x.io", "h", Role::Waiter).await.unwrap();
        create(&db.pool, "bob", "bob@x.io", "h", Role::KitchenStaff).await.unwrap();

        let names: Vec<String> = find_staff(&db.pool).await.unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, ["bob", "zoe"]);
    }
}
