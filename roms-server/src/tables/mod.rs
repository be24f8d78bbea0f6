//! 桌台协调器 - 呼叫服务员、处理呼叫、占用状态

pub mod coordinator;

pub use coordinator::TableCoordinator;
