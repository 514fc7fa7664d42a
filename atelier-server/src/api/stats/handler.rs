//! Stats API Handlers

use axum::{
    Json,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use shared::feed::FeedMessage;
use shared::stats::StatusCounts;

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/stats/status-counts - 当前各状态订单数
pub async fn status_counts(State(state): State<ServerState>) -> AppResult<Json<StatusCounts>> {
    let counts = *state.status_counts().borrow();
    Ok(Json(counts))
}

/// GET /api/stats/feed - 计数订阅 (WebSocket)
///
/// 推送当前计数，此后每次上游快照触发重算时推送新值。
pub async fn feed(State(state): State<ServerState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| stream_counts(socket, state))
}

async fn stream_counts(mut socket: WebSocket, state: ServerState) {
    let mut counts_rx = state.status_counts();

    loop {
        // Latest value first (including the initial one), then wait
        let counts = *counts_rx.borrow_and_update();
        let Ok(text) = FeedMessage::status_counts(counts).to_json() else {
            break;
        };
        if socket.send(Message::Text(text.into())).await.is_err() {
            break;
        }

        tokio::select! {
            changed = counts_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
