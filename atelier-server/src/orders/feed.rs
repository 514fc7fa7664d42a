//! Order snapshot feed
//!
//! # 架构
//!
//! ```text
//! OrderStore ──▶ notify(OrderChange) ──▶ broadcast::Sender
//!                                             │
//!                              ┌──────────────┼──────────────┐
//!                              ▼              ▼              ▼
//!                        subscription   subscription   subscription
//!                        (per filter)   (per filter)   (per filter)
//!                              │              │              │
//!                        re-query store, push FULL snapshot
//! ```
//!
//! 订阅流只推全量快照，永远不推增量：每次相关变更后重新查询
//! 过滤视图并整体下发。带宽换一致性，在本系统的规模下成立。
//!
//! broadcast 接收端滞后 (Lagged) 时不报错：跳过的变更信号和
//! 合并的信号无法区分，重新查询一次即可补上最新状态。

use crate::db::repository::OrderRepository;
use shared::order::{Order, OrderFilter, OrderStatus};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

/// Capacity of the change-signal channel
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Capacity of each subscription's snapshot channel
const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Filter-relevant projection of an order before/after a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeScope {
    pub status: OrderStatus,
    pub created_by: String,
}

/// One committed write, as seen by subscription filters.
///
/// `before` is `None` for creations, `after` is `None` for deletions.
#[derive(Debug, Clone)]
pub struct OrderChange {
    pub order_id: String,
    pub before: Option<ChangeScope>,
    pub after: Option<ChangeScope>,
}

impl OrderChange {
    pub fn created(order_id: impl Into<String>, after: ChangeScope) -> Self {
        Self {
            order_id: order_id.into(),
            before: None,
            after: Some(after),
        }
    }

    pub fn updated(order_id: impl Into<String>, before: ChangeScope, after: ChangeScope) -> Self {
        Self {
            order_id: order_id.into(),
            before: Some(before),
            after: Some(after),
        }
    }

    pub fn removed(order_id: impl Into<String>, before: ChangeScope) -> Self {
        Self {
            order_id: order_id.into(),
            before: Some(before),
            after: None,
        }
    }

    /// Does this change alter the result set of `filter`?
    ///
    /// An order *leaving* the filtered view changes the list just as
    /// much as one entering it, so both images are consulted.
    pub fn concerns(&self, filter: &OrderFilter) -> bool {
        let before = self
            .before
            .as_ref()
            .is_some_and(|s| filter.matches(s.status, &s.created_by));
        let after = self
            .after
            .as_ref()
            .is_some_and(|s| filter.matches(s.status, &s.created_by));
        before || after
    }
}

/// Fan-out hub: one per `OrderStore`
#[derive(Clone)]
pub struct OrderFeed {
    repo: OrderRepository,
    change_tx: broadcast::Sender<OrderChange>,
    shutdown: CancellationToken,
}

impl OrderFeed {
    pub fn new(repo: OrderRepository) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            repo,
            change_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Announce a committed write. Called by the store *after* the
    /// primary write is durable, never before.
    pub fn notify(&self, change: OrderChange) {
        // No receivers is fine: nobody is watching right now
        let _ = self.change_tx.send(change);
    }

    /// Open a snapshot subscription for `filter`.
    ///
    /// The subscription immediately delivers the current matching
    /// list, then re-delivers the full list after every committed
    /// write whose before- or after-image matches the filter.
    pub fn subscribe(&self, filter: OrderFilter) -> OrderSubscription {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let mut changes = self.change_tx.subscribe();
        let token = self.shutdown.child_token();
        let task_token = token.clone();
        let repo = self.repo.clone();

        tokio::spawn(async move {
            // Initial snapshot
            if !deliver(&repo, &filter, &snapshot_tx).await {
                return;
            }

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    change = changes.recv() => match change {
                        Ok(change) => {
                            if !change.concerns(&filter) {
                                continue;
                            }
                            if !deliver(&repo, &filter, &snapshot_tx).await {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Order feed lagged, re-querying snapshot");
                            if !deliver(&repo, &filter, &snapshot_tx).await {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        OrderSubscription {
            rx: snapshot_rx,
            token,
        }
    }

    /// Cancel every open subscription (server shutdown)
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Query the filtered view and push it; `false` when the consumer is
/// gone and the task should stop.
async fn deliver(
    repo: &OrderRepository,
    filter: &OrderFilter,
    tx: &mpsc::Sender<Vec<Order>>,
) -> bool {
    match repo.find_all(filter).await {
        Ok(rows) => {
            let snapshot: Vec<Order> = rows.into_iter().map(|r| r.into_order()).collect();
            tx.send(snapshot).await.is_ok()
        }
        Err(e) => {
            // Reads are retried on the next change signal
            tracing::warn!(error = %e, "Snapshot query failed, skipping emission");
            true
        }
    }
}

/// Handle to one snapshot stream.
///
/// Dropping the handle cancels delivery; no emissions happen after
/// cancellation.
pub struct OrderSubscription {
    rx: mpsc::Receiver<Vec<Order>>,
    token: CancellationToken,
}

impl OrderSubscription {
    /// Next full snapshot; `None` once cancelled and drained
    pub async fn recv(&mut self) -> Option<Vec<Order>> {
        self.rx.recv().await
    }

    /// Stop delivery explicitly
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for OrderSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(status: OrderStatus, created_by: &str) -> ChangeScope {
        ChangeScope {
            status,
            created_by: created_by.to_string(),
        }
    }

    #[test]
    fn test_creation_concerns_matching_filters() {
        let change = OrderChange::created("order:1", scope(OrderStatus::Pending, "u1"));

        assert!(change.concerns(&OrderFilter::all()));
        assert!(change.concerns(&OrderFilter::by_status(OrderStatus::Pending)));
        assert!(change.concerns(&OrderFilter::by_creator("u1")));
        assert!(!change.concerns(&OrderFilter::by_status(OrderStatus::Accepted)));
        assert!(!change.concerns(&OrderFilter::by_creator("u2")));
    }

    #[test]
    fn test_order_leaving_a_view_still_concerns_it() {
        // pending -> accepted removes the order from a pending-only view
        let change = OrderChange::updated(
            "order:1",
            scope(OrderStatus::Pending, "u1"),
            scope(OrderStatus::Accepted, "u1"),
        );
        assert!(change.concerns(&OrderFilter::by_status(OrderStatus::Pending)));
        assert!(change.concerns(&OrderFilter::by_status(OrderStatus::Accepted)));
        assert!(!change.concerns(&OrderFilter::by_status(OrderStatus::Fini)));
    }

    #[test]
    fn test_removal_concerns_the_previous_view() {
        let change = OrderChange::removed("order:1", scope(OrderStatus::Pending, "u1"));
        assert!(change.concerns(&OrderFilter::by_status(OrderStatus::Pending)));
        assert!(!change.concerns(&OrderFilter::by_status(OrderStatus::Charge)));
    }
}
