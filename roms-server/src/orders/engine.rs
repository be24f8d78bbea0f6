//! Order Engine
//!
//! Owns every write to `customer_order` / `order_item`. Multi-row writes
//! (placing an order with N lines, settling a table) run in one SQLite
//! transaction; status changes are a compare-and-swap on the order version.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::RealtimeEvent;
use shared::models::{
    Order, OrderCreate, OrderStatus, OrderStatusUpdate, PaymentMethod, Settlement, TableStatus,
};
use shared::util::now_millis;
use sqlx::SqlitePool;

use super::state_machine::{Transition, check_transition};
use crate::auth::CurrentUser;
use crate::db::repository::{RepoError, dining_table, menu_item, order};
use crate::message::MessageBus;
use crate::money;
use crate::security_log;

/// 并发修改时的最大重试次数 (未携带 expected_version 的请求)
const MAX_CAS_ATTEMPTS: usize = 3;

#[derive(Debug, Clone)]
pub struct OrderEngine {
    pool: SqlitePool,
    bus: MessageBus,
}

fn order_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        .with_detail("order_id", id)
}

fn table_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::TableNotFound, format!("Table {id} not found"))
        .with_detail("table_id", id)
}

impl OrderEngine {
    pub fn new(pool: SqlitePool, bus: MessageBus) -> Self {
        Self { pool, bus }
    }

    // ========== 下单 ==========

    /// Place an order, freezing each item's current price into its line
    ///
    /// Everything is validated before the first write. Prices are read and the
    /// header and all lines inserted in one transaction.
    pub async fn create_order(&self, req: OrderCreate) -> AppResult<Order> {
        if req.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        if let Some(bad) = req
            .items
            .iter()
            .find(|l| l.quantity < 1 || l.quantity > money::MAX_QUANTITY)
        {
            return Err(AppError::new(ErrorCode::OrderInvalidQuantity)
                .with_detail("menu_item_id", bad.menu_item_id)
                .with_detail("quantity", bad.quantity));
        }

        if dining_table::find_by_id(&self.pool, req.table_id)
            .await?
            .is_none()
        {
            return Err(table_not_found(req.table_id));
        }

        // 价格快照与插入在同一事务内读取；校验失败时 tx 未提交，drop 时回滚
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let mut priced = Vec::with_capacity(req.items.len());
        for line in &req.items {
            let price = menu_item::find_price(&mut *tx, line.menu_item_id)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::MenuItemNotFound,
                        format!("Menu item {} not found", line.menu_item_id),
                    )
                    .with_detail("menu_item_id", line.menu_item_id)
                })?;
            priced.push((line.menu_item_id, line.quantity, price));
        }
        let total = money::order_total(priced.iter().map(|(_, qty, price)| (*price, *qty)));

        let now = now_millis();
        let order_id = order::insert(&mut *tx, req.table_id, total, now).await?;
        for (menu_item_id, quantity, price) in &priced {
            order::insert_line(&mut *tx, order_id, *menu_item_id, *quantity, *price).await?;
        }
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            order_id,
            table_id = req.table_id,
            lines = priced.len(),
            total,
            "Order created"
        );
        self.bus.publish(RealtimeEvent::OrderCreated {
            table_id: req.table_id,
            order_id,
        });

        self.get_order(order_id).await
    }

    // ========== 查询 ==========

    pub async fn get_order(&self, id: i64) -> AppResult<Order> {
        order::find_hydrated(&self.pool, id)
            .await?
            .ok_or_else(|| order_not_found(id))
    }

    /// Orders not yet paid, newest first
    pub async fn list_active(&self) -> AppResult<Vec<Order>> {
        Ok(order::find_active(&self.pool).await?)
    }

    /// Unpaid orders of one table, newest first (the customer's poll)
    pub async fn list_for_table(&self, table_id: i64) -> AppResult<Vec<Order>> {
        if dining_table::find_by_id(&self.pool, table_id)
            .await?
            .is_none()
        {
            return Err(table_not_found(table_id));
        }
        Ok(order::find_active_by_table(&self.pool, table_id).await?)
    }

    // ========== 状态流转 ==========

    /// Move one order to `req.status` on behalf of `actor`
    ///
    /// With `expected_version` the caller's view must be current. Without it a
    /// lost compare-and-swap is re-evaluated against the fresh row, so a racing
    /// request for the same target ends as an idempotent success.
    pub async fn transition(
        &self,
        order_id: i64,
        req: OrderStatusUpdate,
        actor: &CurrentUser,
    ) -> AppResult<Order> {
        let target = req.status;

        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let current = order::find_by_id(&self.pool, order_id)
                .await?
                .ok_or_else(|| order_not_found(order_id))?;

            let decision = check_transition(current.status, target, actor.role).inspect_err(|e| {
                if e.code == ErrorCode::OrderStatusForbidden {
                    security_log!(
                        WARN,
                        "order_status_forbidden",
                        user_id = actor.id,
                        username = %actor.username,
                        user_role = %actor.role,
                        order_id,
                        target_status = %target
                    );
                }
            })?;

            if let Some(expected) = req.expected_version
                && expected != current.version
            {
                return Err(AppError::new(ErrorCode::OrderVersionConflict)
                    .with_detail("order_id", order_id)
                    .with_detail("expected_version", expected)
                    .with_detail("current_version", current.version));
            }

            if decision == Transition::Unchanged {
                return self.get_order(order_id).await;
            }

            let now = now_millis();
            if order::update_status_if_version(&self.pool, order_id, target, current.version, now)
                .await?
            {
                tracing::info!(
                    order_id,
                    table_id = current.table_id,
                    from = %current.status,
                    to = %target,
                    user_id = actor.id,
                    "Order status changed"
                );
                self.bus.publish(RealtimeEvent::OrderStatusChanged {
                    table_id: current.table_id,
                    order_id,
                    status: target,
                });
                return self.get_order(order_id).await;
            }

            tracing::debug!(order_id, attempt, "Order changed concurrently, re-reading");
        }

        Err(AppError::new(ErrorCode::OrderVersionConflict).with_detail("order_id", order_id))
    }

    // ========== 结账 ==========

    /// Settle every unpaid order of a table and free the table
    ///
    /// Orders and the table row change in one transaction; any failure rolls
    /// all of it back. A table without open orders is still reset.
    pub async fn settle_table(
        &self,
        table_id: i64,
        payment_method: Option<PaymentMethod>,
    ) -> AppResult<Settlement> {
        let now = now_millis();

        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let orders_settled = order::settle_by_table(&mut *tx, table_id, payment_method, now).await?;
        if dining_table::reset_after_settlement(&mut *tx, table_id, now).await? == 0 {
            // tx 未提交，drop 时回滚
            return Err(table_not_found(table_id));
        }
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            table_id,
            orders_settled,
            payment_method = payment_method.map(|m| m.as_str()),
            "Table settled"
        );
        self.bus.publish(RealtimeEvent::PaymentCompleted {
            table_number: table_id,
            timestamp: now,
            orders_settled,
            payment_method,
        });
        self.bus.publish(RealtimeEvent::TableStatusChanged {
            table_id,
            status: TableStatus::Available,
            needs_waiter: false,
        });

        Ok(Settlement {
            table_id,
            orders_settled,
            payment_method,
            settled_at: now,
        })
    }

    // ========== 清理 ==========

    /// Delete every order (settled or not) of one table
    pub async fn clear_table(&self, table_id: i64) -> AppResult<u64> {
        if dining_table::find_by_id(&self.pool, table_id)
            .await?
            .is_none()
        {
            return Err(table_not_found(table_id));
        }
        let removed = order::delete_by_table(&self.pool, table_id).await?;
        tracing::info!(table_id, removed, "Table orders cleared");
        Ok(removed)
    }

    /// Wipe all orders (demo reset)
    pub async fn clear_all(&self) -> AppResult<u64> {
        let removed = order::delete_all(&self.pool).await?;
        tracing::warn!(removed, "All orders cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{OrderLineInput, Role};

    struct Fixture {
        engine: OrderEngine,
        bus: MessageBus,
        pool: SqlitePool,
        soup: i64,
    }

    async fn fixture() -> Fixture {
        let db = DbService::open_in_memory().await.unwrap();
        dining_table::insert_if_missing(&db.pool, 1, 4).await.unwrap();
        menu_item::insert_if_missing(&db.pool, "Soup", "", 4.5, "Starters")
            .await
            .unwrap();
        let soup = menu_item::find_all(&db.pool).await.unwrap()[0].id;
        let bus = MessageBus::new();
        Fixture {
            engine: OrderEngine::new(db.pool.clone(), bus.clone()),
            bus,
            pool: db.pool,
            soup,
        }
    }

    fn actor(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "tester".into(),
            email: "t@example.com".into(),
            role,
        }
    }

    fn to(status: OrderStatus) -> OrderStatusUpdate {
        OrderStatusUpdate {
            status,
            expected_version: None,
        }
    }

    #[tokio::test]
    async fn test_empty_order_is_rejected() {
        let f = fixture().await;
        let err = f
            .engine
            .create_order(OrderCreate {
                table_id: 1,
                items: vec![],
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderEmpty);
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let f = fixture().await;
        let err = f
            .engine
            .create_order(OrderCreate {
                table_id: 1,
                items: vec![OrderLineInput {
                    menu_item_id: f.soup,
                    quantity: 0,
                }],
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderInvalidQuantity);
    }

    #[tokio::test]
    async fn test_unknown_table() {
        let f = fixture().await;
        let err = f
            .engine
            .create_order(OrderCreate {
                table_id: 99,
                items: vec![OrderLineInput {
                    menu_item_id: f.soup,
                    quantity: 1,
                }],
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_create_publishes_order_created() {
        let f = fixture().await;
        let mut rx = f.bus.subscribe();
        let order = f
            .engine
            .create_order(OrderCreate {
                table_id: 1,
                items: vec![OrderLineInput {
                    menu_item_id: f.soup,
                    quantity: 3,
                }],
            })
            .await
            .unwrap();

        assert_eq!(order.total_amount, 13.5);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            rx.recv().await.unwrap(),
            RealtimeEvent::OrderCreated {
                table_id: 1,
                order_id: order.id
            }
        );
    }

    #[tokio::test]
    async fn test_expected_version_mismatch() {
        let f = fixture().await;
        let order = f
            .engine
            .create_order(OrderCreate {
                table_id: 1,
                items: vec![OrderLineInput {
                    menu_item_id: f.soup,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();
        let kitchen = actor(Role::KitchenStaff);

        f.engine
            .transition(order.id, to(OrderStatus::Preparing), &kitchen)
            .await
            .unwrap();

        let err = f
            .engine
            .transition(
                order.id,
                OrderStatusUpdate {
                    status: OrderStatus::Ready,
                    expected_version: Some(order.version),
                },
                &kitchen,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderVersionConflict);
        assert_eq!(
            f.engine.get_order(order.id).await.unwrap().status,
            OrderStatus::Preparing
        );
    }

    #[tokio::test]
    async fn test_repeated_status_is_a_no_op() {
        let f = fixture().await;
        let order = f
            .engine
            .create_order(OrderCreate {
                table_id: 1,
                items: vec![OrderLineInput {
                    menu_item_id: f.soup,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();
        let kitchen = actor(Role::KitchenStaff);

        let first = f
            .engine
            .transition(order.id, to(OrderStatus::Preparing), &kitchen)
            .await
            .unwrap();
        let mut rx = f.bus.subscribe();
        let second = f
            .engine
            .transition(order.id, to(OrderStatus::Preparing), &kitchen)
            .await
            .unwrap();

        assert_eq!(first.version, second.version);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_paid_sets_paid_at() {
        let f = fixture().await;
        let order = f
            .engine
            .create_order(OrderCreate {
                table_id: 1,
                items: vec![OrderLineInput {
                    menu_item_id: f.soup,
                    quantity: 1,
                }],
            })
            .await
            .unwrap();
        let admin = actor(Role::Admin);
        for status in [
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::Paid,
        ] {
            f.engine.transition(order.id, to(status), &admin).await.unwrap();
        }

        let order = f.engine.get_order(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.version, 5);
        assert!(order.paid_at.is_some());
        assert!(f.engine.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settle_unknown_table_rolls_back() {
        let f = fixture().await;
        let err = f.engine.settle_table(42, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_settle_empty_table_still_resets() {
        let f = fixture().await;
        dining_table::set_needs_waiter(&f.pool, 1, true).await.unwrap();

        let settlement = f.engine.settle_table(1, Some(PaymentMethod::Card)).await.unwrap();
        assert_eq!(settlement.orders_settled, 0);

        let table = dining_table::find_by_id(&f.pool, 1).await.unwrap().unwrap();
        assert!(!table.needs_waiter);
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn test_clear_table() {
        let f = fixture().await;
        f.engine
            .create_order(OrderCreate {
                table_id: 1,
                items: vec![OrderLineInput {
                    menu_item_id: f.soup,
                    quantity: 2,
                }],
            })
            .await
            .unwrap();

        assert_eq!(f.engine.clear_table(1).await.unwrap(), 1);
        assert!(f.engine.list_for_table(1).await.unwrap().is_empty());
        assert_eq!(
            f.engine.clear_table(8).await.unwrap_err().code,
            ErrorCode::TableNotFound
        );
    }
}
