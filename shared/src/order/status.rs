//! Order status pipeline
//!
//! 订单状态机：严格线性流水线 + 一条仅从 pending 可达的拒绝分支。
//!
//! ```text
//! pending ──▶ accepted ──▶ en_cours ──▶ fini ──▶ charge
//!    │
//!    └──▶ rejected
//! ```
//!
//! `charge` 和 `rejected` 是终态。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 等待审批
    Pending,
    /// 已接受，待排产
    Accepted,
    /// 生产中（需要工时预估）
    EnCours,
    /// 生产完成
    Fini,
    /// 已装车（终态）
    Charge,
    /// 已拒绝（终态，需要拒绝原因）
    Rejected,
}

impl OrderStatus {
    /// All statuses, in pipeline order (rejection branch last)
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::EnCours,
        OrderStatus::Fini,
        OrderStatus::Charge,
        OrderStatus::Rejected,
    ];

    /// Wire representation ("en_cours", not "EnCours")
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::EnCours => "en_cours",
            OrderStatus::Fini => "fini",
            OrderStatus::Charge => "charge",
            OrderStatus::Rejected => "rejected",
        }
    }

    /// Legal transition check.
    ///
    /// The pipeline only moves forward; `rejected` is reachable from
    /// `pending` alone. Self-transitions are not part of the table —
    /// an originator edit re-enters `pending` through `update`, not
    /// through `transition`.
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, Accepted) | (Pending, Rejected) | (Accepted, EnCours) | (EnCours, Fini)
                | (Fini, Charge)
        )
    }

    /// 终态：不再接受任何流转
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Charge | OrderStatus::Rejected)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_moves_forward_only() {
        use OrderStatus::*;
        let legal = [
            (Pending, Accepted),
            (Pending, Rejected),
            (Accepted, EnCours),
            (EnCours, Fini),
            (Fini, Charge),
        ];

        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Charge.is_terminal());
        assert!(OrderStatus::Rejected.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::EnCours.is_terminal());
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&OrderStatus::EnCours).unwrap();
        assert_eq!(json, "\"en_cours\"");

        let parsed: OrderStatus = serde_json::from_str("\"charge\"").unwrap();
        assert_eq!(parsed, OrderStatus::Charge);
    }
}
