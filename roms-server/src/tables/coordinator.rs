//! Table Coordinator
//!
//! Owns the attention flag and occupancy of each table. Settlement resets
//! both as part of the order engine's transaction; everything else goes
//! through here.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::RealtimeEvent;
use shared::models::{AttentionReason, DiningTable, DiningTableUpdate};
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db::repository::{RepoError, dining_table};
use crate::message::MessageBus;

#[derive(Debug, Clone)]
pub struct TableCoordinator {
    pool: SqlitePool,
    bus: MessageBus,
}

fn table_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
        .with_detail("table_id", id)
}

fn table_error(id: i64) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::NotFound(_) => table_not_found(id),
        other => other.into(),
    }
}

impl TableCoordinator {
    pub fn new(pool: SqlitePool, bus: MessageBus) -> Self {
        Self { pool, bus }
    }

    /// All tables ordered by number
    pub async fn list_tables(&self) -> AppResult<Vec<DiningTable>> {
        Ok(dining_table::find_all(&self.pool).await?)
    }

    pub async fn get_table(&self, id: i64) -> AppResult<DiningTable> {
        dining_table::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| table_not_found(id))
    }

    /// Customer summons a waiter; occupancy is left alone
    pub async fn call_waiter(&self, id: i64, reason: AttentionReason) -> AppResult<DiningTable> {
        let table = dining_table::set_needs_waiter(&self.pool, id, true)
            .await
            .map_err(table_error(id))?;

        tracing::info!(table_id = id, reason = reason.as_str(), "Waiter called");
        self.bus.publish(RealtimeEvent::WaiterCalled {
            table_number: id,
            reason,
            timestamp: now_millis(),
        });
        Ok(table)
    }

    /// Waiter resolved the call in person
    pub async fn attend(&self, id: i64) -> AppResult<DiningTable> {
        let table = dining_table::set_needs_waiter(&self.pool, id, false)
            .await
            .map_err(table_error(id))?;

        tracing::info!(table_id = id, "Table attended");
        self.publish_status(&table);
        Ok(table)
    }

    /// Toggle occupancy and/or the attention flag
    pub async fn update_table(&self, id: i64, data: DiningTableUpdate) -> AppResult<DiningTable> {
        if data.status.is_none() && data.needs_waiter.is_none() {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "Provide status or needs_waiter",
            ));
        }

        let table = dining_table::update(&self.pool, id, data)
            .await
            .map_err(table_error(id))?;

        tracing::info!(
            table_id = id,
            status = table.status.as_str(),
            needs_waiter = table.needs_waiter,
            "Table updated"
        );
        self.publish_status(&table);
        Ok(table)
    }

    fn publish_status(&self, table: &DiningTable) {
        self.bus.publish(RealtimeEvent::TableStatusChanged {
            table_id: table.id,
            status: table.status,
            needs_waiter: table.needs_waiter,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::TableStatus;

    async fn coordinator() -> (TableCoordinator, MessageBus) {
        let db = DbService::open_in_memory().await.unwrap();
        for n in 1..=3 {
            dining_table::insert_if_missing(&db.pool, n, 4).await.unwrap();
        }
        let bus = MessageBus::new();
        (TableCoordinator::new(db.pool, bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_attend_clears_flag_and_notifies() {
        let (tables, bus) = coordinator().await;
        tables.call_waiter(2, AttentionReason::Attention).await.unwrap();

        let mut rx = bus.subscribe();
        let table = tables.attend(2).await.unwrap();
        assert!(!table.needs_waiter);
        assert_eq!(
            rx.recv().await.unwrap(),
            RealtimeEvent::TableStatusChanged {
                table_id: 2,
                status: TableStatus::Available,
                needs_waiter: false,
            }
        );
    }

    #[tokio::test]
    async fn test_update_occupancy() {
        let (tables, _bus) = coordinator().await;
        let table = tables
            .update_table(
                3,
                DiningTableUpdate {
                    status: Some(TableStatus::Occupied),
                    needs_waiter: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(table.status, TableStatus::Occupied);
        assert!(!table.needs_waiter);
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let (tables, _bus) = coordinator().await;
        let err = tables
            .update_table(
                3,
                DiningTableUpdate {
                    status: None,
                    needs_waiter: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[tokio::test]
    async fn test_unknown_table_maps_to_table_not_found() {
        let (tables, _bus) = coordinator().await;
        let err = tables.call_waiter(9, AttentionReason::Payment).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
        assert_eq!(tables.get_table(9).await.unwrap_err().code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_tables_ordered_by_number() {
        let (tables, _bus) = coordinator().await;
        let ids: Vec<i64> = tables.list_tables().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, [1, 2, 3]);
    }
}
