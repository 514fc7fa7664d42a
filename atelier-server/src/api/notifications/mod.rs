//! Notification API 模块

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/feed", get(handler::feed))
        .route("/{id}", delete(handler::delete))
        .route("/{id}/read", post(handler::mark_read))
}
