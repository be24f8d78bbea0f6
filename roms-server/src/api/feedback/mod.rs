//! Feedback API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/feedback", routes())
}

fn routes() -> Router<ServerState> {
    let public_routes = Router::new()
        .route("/", post(handler::create))
        .route("/table/{table_id}", get(handler::list_for_table));

    let admin_routes = Router::new()
        .route("/", get(handler::list))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(admin_routes)
}
