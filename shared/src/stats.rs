//! Per-status order counts
//!
//! 派生视图：每次全量快照到达时整体重算，不保留增量状态。

use crate::order::{Order, OrderStatus};
use serde::{Deserialize, Serialize};

/// Live per-status counts for dashboard summaries
///
/// Every status owns a bucket even when its count is zero, so
/// consumers never need to special-case missing keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: u32,
    pub accepted: u32,
    pub rejected: u32,
    pub en_cours: u32,
    pub fini: u32,
    pub charge: u32,
}

impl StatusCounts {
    /// Full recount over a snapshot, the only way counts are produced.
    pub fn of(orders: &[Order]) -> Self {
        let mut counts = Self::default();
        for order in orders {
            *counts.bucket_mut(order.status) += 1;
        }
        counts
    }

    pub fn get(&self, status: OrderStatus) -> u32 {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Accepted => self.accepted,
            OrderStatus::Rejected => self.rejected,
            OrderStatus::EnCours => self.en_cours,
            OrderStatus::Fini => self.fini,
            OrderStatus::Charge => self.charge,
        }
    }

    pub fn total(&self) -> u32 {
        self.pending + self.accepted + self.rejected + self.en_cours + self.fini + self.charge
    }

    fn bucket_mut(&mut self, status: OrderStatus) -> &mut u32 {
        match status {
            OrderStatus::Pending => &mut self.pending,
            OrderStatus::Accepted => &mut self.accepted,
            OrderStatus::Rejected => &mut self.rejected,
            OrderStatus::EnCours => &mut self.en_cours,
            OrderStatus::Fini => &mut self.fini,
            OrderStatus::Charge => &mut self.charge,
        }
    }
}
