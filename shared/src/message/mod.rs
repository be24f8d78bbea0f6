//! 实时通知消息类型定义
//!
//! 服务端通过消息总线广播这些事件，再经 WebSocket 以 JSON 文本帧推送给
//! 顾客、后厨、服务员和管理端。事件只表示"有变化，请重新拉取"，
//! 不携带可直接套用的完整状态。

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{AttentionReason, OrderStatus, PaymentMethod, TableStatus};

pub mod payload;
pub use payload::*;

/// 事件名称（订阅方按名称区分）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    OrderCreated,
    OrderStatusChanged,
    TableStatusChanged,
    WaiterCalled,
    PaymentCompleted,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderCreated => "orderCreated",
            Self::OrderStatusChanged => "orderStatusChanged",
            Self::TableStatusChanged => "tableStatusChanged",
            Self::WaiterCalled => "waiterCalled",
            Self::PaymentCompleted => "paymentCompleted",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 广播事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RealtimeEvent {
    OrderCreated {
        table_id: i64,
        order_id: i64,
    },
    OrderStatusChanged {
        // 顾客端按 table_id 过滤自己桌的状态变化
        #[serde(rename = "table_id")]
        table_id: i64,
        order_id: i64,
        status: OrderStatus,
    },
    TableStatusChanged {
        table_id: i64,
        status: TableStatus,
        needs_waiter: bool,
    },
    WaiterCalled {
        table_number: i64,
        #[serde(rename = "type")]
        reason: AttentionReason,
        timestamp: i64,
    },
    PaymentCompleted {
        table_number: i64,
        timestamp: i64,
        orders_settled: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payment_method: Option<PaymentMethod>,
    },
}

impl RealtimeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::OrderCreated { .. } => EventKind::OrderCreated,
            Self::OrderStatusChanged { .. } => EventKind::OrderStatusChanged,
            Self::TableStatusChanged { .. } => EventKind::TableStatusChanged,
            Self::WaiterCalled { .. } => EventKind::WaiterCalled,
            Self::PaymentCompleted { .. } => EventKind::PaymentCompleted,
        }
    }

    /// 事件所属桌号（订阅方用来判断相关性）
    pub fn table_id(&self) -> Option<i64> {
        match self {
            Self::OrderCreated { table_id, .. }
            | Self::OrderStatusChanged { table_id, .. }
            | Self::TableStatusChanged { table_id, .. } => Some(*table_id),
            Self::WaiterCalled { table_number, .. }
            | Self::PaymentCompleted { table_number, .. } => Some(*table_number),
        }
    }

    /// 是否与某张桌相关；不带桌号的事件对所有人可见
    pub fn concerns_table(&self, table: i64) -> bool {
        self.table_id().is_none_or(|t| t == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn waiter_called_wire_shape() {
        let event = RealtimeEvent::WaiterCalled {
            table_number: 7,
            reason: AttentionReason::Payment,
            timestamp: 1_700_000_000_000,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "event": "waiterCalled",
                "tableNumber": 7,
                "type": "payment",
                "timestamp": 1_700_000_000_000i64,
            })
        );
        assert_eq!(event.kind(), EventKind::WaiterCalled);
    }

    #[test]
    fn order_status_changed_wire_shape() {
        let event = RealtimeEvent::OrderStatusChanged {
            table_id: 4,
            order_id: 11,
            status: OrderStatus::Ready,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "orderStatusChanged");
        assert_eq!(value["table_id"], 4);
        assert!(value.get("tableId").is_none());
        assert_eq!(value["orderId"], 11);
        assert_eq!(value["status"], "ready");
    }

    #[test]
    fn payment_completed_omits_missing_method() {
        let event = RealtimeEvent::PaymentCompleted {
            table_number: 4,
            timestamp: 1,
            orders_settled: 2,
            payment_method: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["ordersSettled"], 2);
        assert!(value.get("paymentMethod").is_none());

        let back: RealtimeEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn table_filter() {
        let event = RealtimeEvent::OrderCreated {
            table_id: 3,
            order_id: 1,
        };
        assert!(event.concerns_table(3));
        assert!(!event.concerns_table(4));
        assert_eq!(event.kind().to_string(), "orderCreated");
    }
}
