//! Dining Table API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_role;
use crate::core::ServerState;
use crate::orders::FLOOR_ROLES;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    // 顾客设备匿名访问
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/call-waiter", post(handler::call_waiter));

    let floor_routes = Router::new()
        .route("/{id}", patch(handler::update))
        .route("/{id}/attend", post(handler::attend))
        .route("/{id}/settle", post(handler::settle))
        .layer(middleware::from_fn(require_role(FLOOR_ROLES)));

    public_routes.merge(floor_routes)
}
