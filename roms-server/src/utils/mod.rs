//! 工具模块
//!
//! - 错误类型 (re-export from `shared::error`)
//! - 日志初始化
//! - 输入校验

pub mod logger;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, ErrorKind};
