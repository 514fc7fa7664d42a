//! Order row model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::order::{Order, OrderStatus, ProductionEstimation, StatusChange};
use surrealdb::RecordId;

pub type OrderRowId = RecordId;

/// Order row matching the `order` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRow {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<OrderRowId>,

    /// "CMD-0001", assigned exactly once at creation, never reused
    pub order_number: String,

    pub client: String,
    pub initial_product: String,
    pub initial_quantity: u32,
    pub final_product: Option<String>,
    pub final_quantity: Option<u32>,
    pub submitter: String,
    pub machine_name: String,
    pub comment: Option<String>,

    pub status: OrderStatus,

    /// 创建者 uid
    pub created_by: String,

    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,

    pub rejection_reason: Option<String>,
    pub production_estimation: Option<ProductionEstimation>,

    #[serde(default)]
    pub history: Vec<StatusChange>,
}

impl OrderRow {
    /// Convert to the wire-level entity ("order:xxxx" string id)
    pub fn into_order(self) -> Order {
        Order {
            id: self.id.map(|id| id.to_string()).unwrap_or_default(),
            order_number: self.order_number,
            client: self.client,
            initial_product: self.initial_product,
            initial_quantity: self.initial_quantity,
            final_product: self.final_product,
            final_quantity: self.final_quantity,
            submitter: self.submitter,
            machine_name: self.machine_name,
            comment: self.comment,
            status: self.status,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            rejection_reason: self.rejection_reason,
            production_estimation: self.production_estimation,
            history: self.history,
        }
    }
}

/// Transition patch, merged into the row on a status change
#[derive(Debug, Clone, Serialize)]
pub struct OrderTransitionPatch {
    pub status: OrderStatus,
    pub updated_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production_estimation: Option<ProductionEstimation>,
    pub history: Vec<StatusChange>,
}

/// Edit patch: full field replacement by the originator.
///
/// 编辑无条件把订单送回审批队列：status 重置为 pending。
#[derive(Debug, Clone, Serialize)]
pub struct OrderEditPatch {
    pub client: String,
    pub initial_product: String,
    pub initial_quantity: u32,
    pub final_product: Option<String>,
    pub final_quantity: Option<u32>,
    pub submitter: String,
    pub machine_name: String,
    pub comment: Option<String>,
    pub status: OrderStatus,
    pub updated_at: i64,
    pub history: Vec<StatusChange>,
}
