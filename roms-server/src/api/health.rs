//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /health | GET | 数据库连通性、事件订阅数 | 无 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "environment": "development",
//!   "uptime_seconds": 42,
//!   "database": { "status": "ok", "latency_ms": 0 },
//!   "event_subscribers": 3
//! }
//! ```

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use std::time::Instant;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    environment: String,
    uptime_seconds: u64,
    database: CheckResult,
    /// 当前 WebSocket 订阅数
    event_subscribers: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

// 首次访问时记录
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let started = START_TIME.get_or_init(Instant::now);

    let db_start = Instant::now();
    let database = if state.db.ping().await {
        CheckResult {
            status: "ok",
            latency_ms: Some(db_start.elapsed().as_millis() as u64),
        }
    } else {
        tracing::warn!("Health check: database unreachable");
        CheckResult {
            status: "error",
            latency_ms: None,
        }
    };

    Json(HealthResponse {
        status: if database.status == "ok" { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        uptime_seconds: started.elapsed().as_secs(),
        database,
        event_subscribers: state.message_bus().subscriber_count(),
    })
}
