//! Shared types for the restaurant order-management service
//!
//! Types used by both the server and its clients: the unified error system,
//! the domain models exchanged over the HTTP API, and the real-time event
//! frames pushed over the notification channel.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, ErrorKind};
pub use message::{EventKind, RealtimeEvent};
pub use serde::{Deserialize, Serialize};
