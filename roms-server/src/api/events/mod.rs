//! Realtime events WebSocket 端点
//!
//! GET /api/events/ws[?table=<n>]
//!
//! 协议 (服务端 → 客户端，JSON 文本帧):
//! - `ready` - 连接建立后的第一帧，携带兜底轮询间隔
//! - 业务事件 - `orderCreated`, `orderStatusChanged`, `tableStatusChanged`,
//!   `waiterCalled`, `paymentCompleted`
//! - `resync` - 订阅方落后、事件已丢失，客户端应立即全量刷新
//!
//! 带 `table` 参数时只推送该桌相关的事件。客户端发送的消息被忽略。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events/ws", get(handler::handle_ws))
}
