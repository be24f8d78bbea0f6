//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Occupancy status (占用状态)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
        }
    }
}

/// Why a customer summoned a waiter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttentionReason {
    /// Generic call
    #[default]
    Attention,
    /// Customer asks for the bill
    Payment,
}

impl AttentionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attention => "attention",
            Self::Payment => "payment",
        }
    }
}

/// Dining table entity (桌台)
///
/// `id` is the physical table number printed on the table's QR code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub capacity: i32,
    pub status: TableStatus,
    pub needs_waiter: bool,
    pub updated_at: i64,
}

/// Update dining table payload (occupancy / attention)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiningTableUpdate {
    pub status: Option<TableStatus>,
    pub needs_waiter: Option<bool>,
}

/// Call waiter payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallWaiterRequest {
    #[serde(rename = "type", default)]
    pub reason: AttentionReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_waiter_reason_defaults_to_attention() {
        let req: CallWaiterRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.reason, AttentionReason::Attention);

        let req: CallWaiterRequest = serde_json::from_str(r#"{"type":"payment"}"#).unwrap();
        assert_eq!(req.reason, AttentionReason::Payment);
    }

    #[test]
    fn table_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&TableStatus::Occupied).unwrap(),
            "\"occupied\""
        );
        assert!(serde_json::from_str::<TableStatus>("\"closed\"").is_err());
    }
}
