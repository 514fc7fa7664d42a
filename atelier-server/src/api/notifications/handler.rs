//! Notification API Handlers

use axum::{
    Json,
    extract::{
        Extension, Path, Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use serde::Deserialize;
use shared::feed::FeedMessage;
use shared::notification::Notification;
use shared::role::Viewer;

use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// GET /api/notifications - 最近事件，新在前
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let limit = query.limit.unwrap_or(state.config.recent_notifications);
    let notifications = state.notifications().recent(limit).await?;
    Ok(Json(notifications))
}

/// POST /api/notifications/:id/read - 标记已读（幂等）
pub async fn mark_read(
    State(state): State<ServerState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.notifications().mark_read(&id, &viewer.uid).await?;
    Ok(Json(true))
}

/// DELETE /api/notifications/:id - 删除事件（幂等）
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.notifications().delete(&id).await?;
    Ok(Json(true))
}

/// GET /api/notifications/feed - 活动流快照订阅 (WebSocket)
pub async fn feed(State(state): State<ServerState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| stream_notifications(socket, state))
}

async fn stream_notifications(mut socket: WebSocket, state: ServerState) {
    let mut subscription = state.notifications().subscribe();

    loop {
        tokio::select! {
            snapshot = subscription.recv() => match snapshot {
                Some(notifications) => {
                    let Ok(text) = FeedMessage::notifications(notifications).to_json() else {
                        break;
                    };
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
