//! Order entity and command payloads
//!
//! 订单是系统的核心实体：由发起方创建，经审批方接受/拒绝，
//! 再由车间操作方沿流水线推进。所有时间戳为 Unix 毫秒。

mod status;

pub use status::OrderStatus;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 生产工时预估（进入 en_cours 时必填）
///
/// Fields are unsigned, so negative values are unrepresentable. Validity
/// additionally requires at least one field to be positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionEstimation {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl ProductionEstimation {
    /// 全零预估视为无效
    pub fn is_valid(&self) -> bool {
        self.days > 0 || self.hours > 0 || self.minutes > 0
    }
}

/// 状态流转历史条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    /// Unix millis
    pub at: i64,
    /// 操作者 uid
    pub by: String,
}

/// Order entity: the full snapshot delivered to dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Record id as "order:xxxx"
    pub id: String,
    /// Human-readable number, "CMD-0001"; unique, assigned once at creation
    pub order_number: String,
    pub client: String,
    pub initial_product: String,
    pub initial_quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_quantity: Option<u32>,
    pub submitter: String,
    pub machine_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub status: OrderStatus,
    /// 创建者 uid
    pub created_by: String,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis, refreshed on every transition and edit
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Present iff the order has ever reached en_cours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_estimation: Option<ProductionEstimation>,
    #[serde(default)]
    pub history: Vec<StatusChange>,
}

/// Create/edit payload: everything the originator supplies
///
/// 编辑是整体字段替换：同一载荷同时用于创建和编辑。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderDraft {
    #[validate(length(min = 1, message = "client is required"))]
    pub client: String,
    #[validate(length(min = 1, message = "initial_product is required"))]
    pub initial_product: String,
    #[validate(range(min = 1, message = "initial_quantity must be at least 1"))]
    pub initial_quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_quantity: Option<u32>,
    #[validate(length(min = 1, message = "submitter is required"))]
    pub submitter: String,
    #[validate(length(min = 1, message = "machine_name is required"))]
    pub machine_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Transition payload
///
/// `rejection_reason` is required when `status == rejected`;
/// `production_estimation` is required when `status == en_cours`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_estimation: Option<ProductionEstimation>,
}

/// Subscription filter: optional conjunction of status and creator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl OrderFilter {
    /// 无过滤条件（全量订阅）
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            created_by: None,
        }
    }

    pub fn by_creator(uid: impl Into<String>) -> Self {
        Self {
            status: None,
            created_by: Some(uid.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.created_by.is_none()
    }

    /// Conjunction semantics: every present clause must match.
    pub fn matches(&self, status: OrderStatus, created_by: &str) -> bool {
        if let Some(s) = self.status
            && s != status
        {
            return false;
        }
        if let Some(ref c) = self.created_by
            && c != created_by
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimation_validity() {
        let all_zero = ProductionEstimation {
            days: 0,
            hours: 0,
            minutes: 0,
        };
        assert!(!all_zero.is_valid());

        let some = ProductionEstimation {
            days: 0,
            hours: 1,
            minutes: 30,
        };
        assert!(some.is_valid());
    }

    #[test]
    fn test_filter_conjunction() {
        let filter = OrderFilter {
            status: Some(OrderStatus::Pending),
            created_by: Some("u1".to_string()),
        };
        assert!(filter.matches(OrderStatus::Pending, "u1"));
        assert!(!filter.matches(OrderStatus::Pending, "u2"));
        assert!(!filter.matches(OrderStatus::Accepted, "u1"));

        assert!(OrderFilter::all().matches(OrderStatus::Charge, "anyone"));
    }

    #[test]
    fn test_draft_validation() {
        use validator::Validate;

        let draft = OrderDraft {
            client: "Acme".to_string(),
            initial_product: "Steel".to_string(),
            initial_quantity: 10,
            final_product: None,
            final_quantity: None,
            submitter: "Mohamed".to_string(),
            machine_name: "CNC".to_string(),
            comment: None,
        };
        assert!(draft.validate().is_ok());

        let empty_client = OrderDraft {
            client: "".to_string(),
            ..draft.clone()
        };
        assert!(empty_client.validate().is_err());

        let zero_quantity = OrderDraft {
            initial_quantity: 0,
            ..draft
        };
        assert!(zero_quantity.validate().is_err());
    }
}
