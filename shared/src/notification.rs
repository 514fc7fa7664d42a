//! Lifecycle notification events
//!
//! 追加式事件日志，与订单订阅流相互独立，供全局活动流消费。
//! 任何观看者都可以标记已读（追加自己的 uid）或删除。

use crate::order::OrderStatus;
use serde::{Deserialize, Serialize};

/// 事件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// 新订单创建
    Created,
    /// 订单被接受
    Accepted,
    /// 其他状态变化
    Status,
}

/// Notification event: append-only, ordered by timestamp descending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Record id as "notification:xxxx"
    pub id: String,
    pub kind: NotificationKind,
    /// Referenced order, "order:xxxx"
    pub order_id: String,
    /// Resulting status of the referenced order
    pub status: OrderStatus,
    /// Human-readable message
    pub message: String,
    /// Display icon tag ("plus", "check", "refresh")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Unix millis
    pub timestamp: i64,
    /// Viewer uids that acknowledged this event (set semantics)
    #[serde(default)]
    pub read_by: Vec<String>,
}

/// Emission payload: the emitter assigns id, timestamp and an empty
/// read set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationInput {
    pub kind: NotificationKind,
    pub order_id: String,
    pub status: OrderStatus,
    pub message: String,
    pub icon: Option<String>,
}

impl NotificationInput {
    pub fn created(order_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Created,
            order_id: order_id.into(),
            status: OrderStatus::Pending,
            message: message.into(),
            icon: Some("plus".to_string()),
        }
    }

    pub fn accepted(order_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Accepted,
            order_id: order_id.into(),
            status: OrderStatus::Accepted,
            message: message.into(),
            icon: Some("check".to_string()),
        }
    }

    pub fn status(
        order_id: impl Into<String>,
        status: OrderStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: NotificationKind::Status,
            order_id: order_id.into(),
            status,
            message: message.into(),
            icon: Some("refresh".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_pick_icons() {
        let created = NotificationInput::created("order:1", "Nouvelle commande CMD-0001");
        assert_eq!(created.kind, NotificationKind::Created);
        assert_eq!(created.icon.as_deref(), Some("plus"));
        assert_eq!(created.status, OrderStatus::Pending);

        let accepted = NotificationInput::accepted("order:1", "Commande acceptée");
        assert_eq!(accepted.icon.as_deref(), Some("check"));

        let status = NotificationInput::status("order:1", OrderStatus::Fini, "Statut modifié");
        assert_eq!(status.icon.as_deref(), Some("refresh"));
        assert_eq!(status.status, OrderStatus::Fini);
    }

    #[test]
    fn test_kind_wire_format() {
        assert_eq!(
            serde_json::to_string(&NotificationKind::Created).unwrap(),
            "\"created\""
        );
    }
}
