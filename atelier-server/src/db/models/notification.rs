//! Notification row model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::notification::{Notification, NotificationInput, NotificationKind};
use shared::order::OrderStatus;
use surrealdb::RecordId;

pub type NotificationRowId = RecordId;

/// Notification row matching the `notification` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRow {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<NotificationRowId>,

    pub kind: NotificationKind,

    /// Referenced order, "order:xxxx"
    pub order_id: String,

    /// Resulting status of the referenced order
    pub status: OrderStatus,

    pub message: String,
    pub icon: Option<String>,

    /// Unix millis
    pub timestamp: i64,

    /// Viewer uids that acknowledged this event
    #[serde(default)]
    pub read_by: Vec<String>,
}

impl NotificationRow {
    /// Build a fresh row from an emission payload
    pub fn from_input(input: NotificationInput, timestamp: i64) -> Self {
        Self {
            id: None,
            kind: input.kind,
            order_id: input.order_id,
            status: input.status,
            message: input.message,
            icon: input.icon,
            timestamp,
            read_by: Vec::new(),
        }
    }

    /// Convert to the wire-level event
    pub fn into_notification(self) -> Notification {
        Notification {
            id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            kind: self.kind,
            order_id: self.order_id,
            status: self.status,
            message: self.message,
            icon: self.icon,
            timestamp: self.timestamp,
            read_by: self.read_by,
        }
    }
}
