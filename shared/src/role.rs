//! Dashboard roles and transition policy
//!
//! 三个角色各自对应一个看板，也各自拥有状态机中的一段：
//! 发起方创建/编辑/删除，审批方接受/拒绝，车间操作方推进生产。
//! 策略在存储边界强制执行；看板只是策略的投影，不是策略本身。

use crate::order::OrderStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 看板角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 订单发起方（创建、编辑、删除 pending 订单）
    Originator,
    /// 审批方（pending -> accepted | rejected）
    Approver,
    /// 车间操作方（accepted -> en_cours -> fini -> charge）
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Originator => "originator",
            Role::Approver => "approver",
            Role::Operator => "operator",
        }
    }

    /// Which role owns a given pipeline edge.
    ///
    /// Edges absent from the state table belong to no role; the
    /// legality check rejects them before policy is consulted.
    pub fn may_transition(self, from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::*;
        match (from, to) {
            (Pending, Accepted) | (Pending, Rejected) => self == Role::Approver,
            (Accepted, EnCours) | (EnCours, Fini) | (Fini, Charge) => self == Role::Operator,
            _ => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current viewer identity, supplied by the auth collaborator
///
/// 核心只消费身份，不做任何凭证校验。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub uid: String,
    pub display_name: String,
    pub role: Role,
}

impl Viewer {
    pub fn new(uid: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderStatus::*;

    #[test]
    fn test_approver_owns_approval_edges() {
        assert!(Role::Approver.may_transition(Pending, Accepted));
        assert!(Role::Approver.may_transition(Pending, Rejected));
        assert!(!Role::Approver.may_transition(Accepted, EnCours));
        assert!(!Role::Originator.may_transition(Pending, Accepted));
    }

    #[test]
    fn test_operator_owns_production_edges() {
        assert!(Role::Operator.may_transition(Accepted, EnCours));
        assert!(Role::Operator.may_transition(EnCours, Fini));
        assert!(Role::Operator.may_transition(Fini, Charge));
        assert!(!Role::Operator.may_transition(Pending, Accepted));
    }

    #[test]
    fn test_illegal_edges_belong_to_no_role() {
        for role in [Role::Originator, Role::Approver, Role::Operator] {
            assert!(!role.may_transition(Pending, Charge));
            assert!(!role.may_transition(Rejected, Pending));
        }
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(
            serde_json::to_string(&Role::Originator).unwrap(),
            "\"originator\""
        );
        let parsed: Role = serde_json::from_str("\"operator\"").unwrap();
        assert_eq!(parsed, Role::Operator);
    }
}
