//! 通知通道 - 进程内广播
//!
//! ```text
//! OrderEngine ─┐
//!              ├─▶ MessageBus::publish ─▶ broadcast::Sender<RealtimeEvent>
//! TableCoord. ─┘                                   │
//!                                     ┌────────────┼────────────┐
//!                                     ▼            ▼            ▼
//!                                  WS viewer    WS viewer    WS viewer
//! ```
//!
//! 事件只表示"有变化，请重新拉取"，不携带权威状态，也不重放。

pub mod bus;

pub use bus::MessageBus;
pub use shared::message::{ControlFrame, EventKind, OutboundFrame, RealtimeEvent};
