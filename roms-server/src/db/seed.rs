//! 启动种子数据
//!
//! 幂等：每次启动都可以执行，已存在的行保持不变。

use crate::auth::password::hash_password;
use crate::core::Config;
use crate::db::repository::{dining_table, menu_item, user};
use crate::utils::{AppError, AppResult};
use shared::models::Role;

/// (name, description, price, category)
const SAMPLE_MENU: &[(&str, &str, f64, &str)] = &[
    (
        "Margherita Pizza",
        "Classic pizza with tomato sauce and mozzarella",
        12.99,
        "Main Course",
    ),
    (
        "Caesar Salad",
        "Fresh romaine lettuce with Caesar dressing",
        8.99,
        "Starters",
    ),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub tables_created: usize,
    pub menu_items_created: usize,
}

pub async fn run(pool: &sqlx::SqlitePool, config: &Config) -> AppResult<SeedReport> {
    let mut report = SeedReport::default();

    if !user::exists_by_email(pool, &config.admin_email).await? {
        let hash = hash_password(&config.admin_password)
            .map_err(|e| AppError::internal(format!("Failed to hash admin password: {e}")))?;
        user::create(
            pool,
            &config.admin_username,
            &config.admin_email,
            &hash,
            Role::Admin,
        )
        .await?;
        report.admin_created = true;
    }

    for id in 1..=config.seed_table_count {
        if dining_table::insert_if_missing(pool, id, config.seed_table_capacity).await? {
            report.tables_created += 1;
        }
    }

    for (name, description, price, category) in SAMPLE_MENU {
        if menu_item::insert_if_missing(pool, name, description, *price, category).await? {
            report.menu_items_created += 1;
        }
    }

    tracing::info!(
        admin_created = report.admin_created,
        tables_created = report.tables_created,
        menu_items_created = report.menu_items_created,
        "Seed data applied"
    );
    Ok(report)
}
