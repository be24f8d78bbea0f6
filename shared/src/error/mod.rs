//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`ErrorKind`]: What the caller should do about it
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Unified API response format
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ErrorKind, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::OrderEmpty);
//! assert_eq!(err.kind(), ErrorKind::Validation);
//!
//! let err = AppError::new(ErrorCode::TableNotFound).with_detail("table_id", 42);
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, 7001);
//! ```

mod category;
mod codes;
mod http;
mod kind;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use kind::ErrorKind;
pub use types::{ApiResponse, AppError, AppResult};
