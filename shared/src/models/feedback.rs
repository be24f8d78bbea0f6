//! Feedback Model

use serde::{Deserialize, Serialize};

/// Customer feedback (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Feedback {
    pub id: i64,
    pub table_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: i64,
}

/// Submit feedback payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackCreate {
    pub table_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
}
