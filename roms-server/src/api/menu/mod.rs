//! Menu API 模块
//!
//! 菜单与配料需求。读取公开 (顾客扫码浏览)，写入仅限管理员。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/menu", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/ingredients", get(handler::list_ingredients));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/ingredients", post(handler::add_ingredient))
        .route(
            "/{id}/ingredients/{inventory_id}",
            put(handler::update_ingredient).delete(handler::remove_ingredient),
        )
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
