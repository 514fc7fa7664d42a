//! Order API Handlers
//!
//! 命令处理器把 [`Viewer`] 身份传给存储核心，由核心执行角色
//! 策略；这里不做任何业务判断。

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
use shared::order::{Order, OrderDraft, OrderFilter, OrderStatus, TransitionRequest};
use shared::role::Viewer;

use crate::core::ServerState;
use crate::utils::AppResult;

/// Query params for listing/subscribing: optional conjunction of
/// status and creator
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub created_by: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> OrderFilter {
        OrderFilter {
            status: self.status,
            created_by: self.created_by,
        }
    }
}

/// GET /api/orders - 过滤列表，最近更新在前
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.order_store().list(&query.into_filter()).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - 单个订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.order_store().get(&id).await?;
    Ok(Json(order))
}

/// POST /api/orders - 创建订单 (发起方)
pub async fn create(
    State(state): State<ServerState>,
    Extension(viewer): Extension<Viewer>,
    Json(draft): Json<OrderDraft>,
) -> AppResult<Json<Order>> {
    let order = state.order_store().create(draft, &viewer).await?;
    Ok(Json(order))
}

/// POST /api/orders/:id/transition - 状态流转 (审批方/操作方)
pub async fn transition(
    State(state): State<ServerState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Json(request): Json<TransitionRequest>,
) -> AppResult<Json<Order>> {
    let order = state.order_store().transition(&id, request, &viewer).await?;
    Ok(Json(order))
}

/// PUT /api/orders/:id - 整体编辑，订单回到 pending (发起方)
pub async fn update(
    State(state): State<ServerState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Json(draft): Json<OrderDraft>,
) -> AppResult<Json<Order>> {
    let order = state.order_store().update(&id, draft, &viewer).await?;
    Ok(Json(order))
}

/// DELETE /api/orders/:id - 硬删除 pending 订单 (发起方)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    state.order_store().remove(&id, &viewer).await?;
    Ok(Json(true))
}

/// GET /api/orders/feed - 快照订阅 (WebSocket)
///
/// 连接后立即收到当前过滤视图的完整列表，此后每次相关变更
/// 重新收到完整列表。
pub async fn feed(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let filter = query.into_filter();
    ws.on_upgrade(move |socket| stream_orders(socket, state, filter))
}

async fn stream_orders(mut socket: WebSocket, state: ServerState, filter: OrderFilter) {
    let mut subscription = state.order_store().subscribe(filter);

    loop {
        tokio::select! {
            snapshot = subscription.recv() => match snapshot {
                Some(orders) => {
                    let Ok(text) = FeedMessage::orders(orders).to_json() else {
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
    // Dropping the subscription cancels delivery
}
