//! Snapshot push envelope
//!
//! 服务器通过 WebSocket 向看板推送全量快照，永远不推增量。
//! 每条消息都是某个订阅流当前的完整一致视图。

use crate::notification::Notification;
use crate::order::Order;
use crate::stats::StatusCounts;
use serde::{Deserialize, Serialize};

/// One frame on a dashboard feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedMessage {
    /// Full ordered order list for the subscription's filter
    Orders { orders: Vec<Order> },
    /// Full notification log, timestamp descending
    Notifications { notifications: Vec<Notification> },
    /// Freshly recomputed per-status counts
    StatusCounts { counts: StatusCounts },
}

impl FeedMessage {
    pub fn orders(orders: Vec<Order>) -> Self {
        FeedMessage::Orders { orders }
    }

    pub fn notifications(notifications: Vec<Notification>) -> Self {
        FeedMessage::Notifications { notifications }
    }

    pub fn status_counts(counts: StatusCounts) -> Self {
        FeedMessage::StatusCounts { counts }
    }

    /// 序列化为一帧文本消息
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// 从一帧文本消息解析
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
