//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 登录、注册、当前用户
//! - [`menu`] - 菜单与配料需求
//! - [`inventory`] - 库存与可售检查
//! - [`tables`] - 桌台、呼叫服务员、结账
//! - [`orders`] - 下单、查询、状态流转
//! - [`feedback`] - 顾客评价
//! - [`staff`] - 员工管理
//! - [`events`] - WebSocket 实时事件

pub mod auth;
pub mod events;
pub mod feedback;
pub mod health;
pub mod inventory;
pub mod menu;
pub mod orders;
pub mod staff;
pub mod tables;

use axum::Router;
use axum::middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator (UUID v4)
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// All routes, no middleware
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(menu::router())
        .merge(inventory::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(feedback::router())
        .merge(staff::router())
        .merge(events::router())
}

/// Fully layered application, used by the server and by router tests
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // JWT 认证 - 最先包裹路由，注入 CurrentUser
        .layer(middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(log_request))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
