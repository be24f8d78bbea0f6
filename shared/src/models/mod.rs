//! Data models
//!
//! Shared between the server and its viewers (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY); timestamps are Unix millis.

pub mod dining_table;
pub mod feedback;
pub mod inventory;
pub mod menu_item;
pub mod order;
pub mod user;

// Re-exports
pub use dining_table::*;
pub use feedback::*;
pub use inventory::*;
pub use menu_item::*;
pub use order::*;
pub use user::*;
