//! ROMS Server - 餐厅点单管理服务
//!
//! # 架构概述
//!
//! - **订单引擎** (`orders`): 下单价格快照、状态机、整桌结账
//! - **桌台协调** (`tables`): 呼叫服务员、到场处理、占用状态
//! - **消息总线** (`message`): 进程内广播，经 WebSocket 推送给各端
//! - **数据库** (`db`): SQLite (WAL) + 嵌入式迁移
//! - **认证** (`auth`): JWT + Argon2，按角色守卫
//! - **HTTP API** (`api`): axum 路由和处理器
//!
//! # 模块结构
//!
//! ```text
//! roms-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、角色
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池、仓储、种子数据
//! ├── message/       # 事件广播
//! ├── orders/        # 订单引擎与状态机
//! ├── tables/        # 桌台协调
//! ├── money.rs       # 金额计算 (rust_decimal)
//! └── utils/         # 日志、错误类型
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod message;
pub mod money;
pub mod orders;
pub mod tables;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use message::{MessageBus, RealtimeEvent};
pub use orders::OrderEngine;
pub use tables::TableCoordinator;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode, ErrorKind};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
    ____  ____  __  ________
   / __ \/ __ \/  |/  / ___/
  / /_/ / / / / /|_/ /\__ \
 / _, _/ /_/ / /  / /___/ /
/_/ |_|\____/_/  /_//____/
    "#
    );
}
