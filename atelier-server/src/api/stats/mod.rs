//! Stats API 模块

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stats", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/status-counts", get(handler::status_counts))
        .route("/feed", get(handler::feed))
}
