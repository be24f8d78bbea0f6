//! Order Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status
///
/// `pending → preparing → ready → served → paid`. `paid` is the only terminal
/// label; the historical `completed` is read as `paid` and never written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Served,
    #[serde(alias = "completed")]
    Paid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Preparing,
        Self::Ready,
        Self::Served,
        Self::Paid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::Served => "served",
            Self::Paid => "paid",
        }
    }

    /// Terminal "settled" state
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid)
    }

    /// The single status reachable from this one
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Pending => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Served),
            Self::Served => Some(Self::Paid),
            Self::Paid => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "ready" => Ok(Self::Ready),
            "served" => Ok(Self::Served),
            "paid" | "completed" => Ok(Self::Paid),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Payment method recorded at settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentMethod {
    Card,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Cash => "cash",
        }
    }
}

/// Order entity (订单)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Table number
    pub table_id: i64,
    pub status: OrderStatus,
    /// Sum of `price_at_time × quantity`, fixed at creation
    pub total_amount: f64,
    /// Incremented on every status change
    pub version: i64,
    pub payment_method: Option<PaymentMethod>,
    pub created_at: i64,
    pub updated_at: i64,
    pub paid_at: Option<i64>,
    /// Line items (hydrated separately)
    #[serde(default)]
    #[cfg_attr(feature = "db", sqlx(skip))]
    pub items: Vec<OrderLine>,
}

/// Order line item with its frozen price
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub quantity: i32,
    /// Menu price at the moment of ordering, never updated
    pub price_at_time: f64,
}

/// One requested line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub menu_item_id: i64,
    pub quantity: i32,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub table_id: i64,
    pub items: Vec<OrderLineInput>,
}

/// Status transition payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
    /// Optimistic concurrency token
    #[serde(default)]
    pub expected_version: Option<i64>,
}

/// Settle payment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettleRequest {
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Result of a table settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub table_id: i64,
    pub orders_settled: u64,
    pub payment_method: Option<PaymentMethod>,
    pub settled_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_is_an_alias_of_paid() {
        let s: OrderStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(s, OrderStatus::Paid);
        assert_eq!("completed".parse::<OrderStatus>().unwrap(), OrderStatus::Paid);
        // 只输出规范标签
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"paid\"");
    }

    #[test]
    fn next_walks_the_lifecycle() {
        let mut s = OrderStatus::Pending;
        let mut path = vec![s];
        while let Some(n) = s.next() {
            path.push(n);
            s = n;
        }
        assert_eq!(path, OrderStatus::ALL.to_vec());
        assert!(s.is_settled());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("cancelled".parse::<OrderStatus>().is_err());
        assert!(serde_json::from_str::<OrderStatus>("\"PAID\"").is_err());
    }

    #[test]
    fn status_update_version_is_optional() {
        let req: OrderStatusUpdate = serde_json::from_str(r#"{"status":"ready"}"#).unwrap();
        assert_eq!(req.status, OrderStatus::Ready);
        assert!(req.expected_version.is_none());
    }
}
