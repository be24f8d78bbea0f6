//! Order API 模块
//!
//! | 路径 | 方法 | 角色 |
//! |------|------|------|
//! | /api/orders | POST | 匿名 (顾客下单) |
//! | /api/orders | GET | 任意已登录 |
//! | /api/orders | DELETE | admin |
//! | /api/orders/{id} | GET | 任意已登录 |
//! | /api/orders/{id}/status | PATCH | 按目标状态校验 |
//! | /api/orders/table/{table_id} | GET | 匿名 (顾客轮询) |
//! | /api/orders/table/{table_id} | DELETE | waiter, admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::auth::{require_admin, require_role};
use crate::core::ServerState;
use crate::orders::FLOOR_ROLES;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // 匿名路由和"任意已登录"路由都由全局 require_auth 区分
    let open_routes = Router::new()
        .route("/", post(handler::create).get(handler::list_active))
        .route("/{id}", get(handler::get_by_id))
        // 角色守卫在状态机里按目标状态判断
        .route("/{id}/status", patch(handler::update_status))
        .route("/table/{table_id}", get(handler::list_for_table));

    let floor_routes = Router::new()
        .route("/table/{table_id}", delete(handler::clear_table))
        .layer(middleware::from_fn(require_role(FLOOR_ROLES)));

    let admin_routes = Router::new()
        .route("/", delete(handler::clear_all))
        .layer(middleware::from_fn(require_admin));

    open_routes.merge(floor_routes).merge(admin_routes)
}
