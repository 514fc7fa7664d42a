//! Status Aggregator
//!
//! 无过滤订单流上的纯归约：每个快照到达时整体重算计数，
//! 不保留任何增量状态。基于增量的计数器一旦漏掉一次更新
//! 就会永久漂移，整体重算的契约天然免疫。
//!
//! 计数通过 `watch` 通道发布：订阅者总是看到最新值，包括
//! 初始快照产生的那一份。

use crate::orders::OrderSubscription;
use shared::stats::StatusCounts;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Derived per-status count view over the live order stream
pub struct StatusAggregator {
    tx: watch::Sender<StatusCounts>,
}

impl StatusAggregator {
    /// Returns the aggregator and the receiver handed to consumers.
    ///
    /// The receiver starts at all-zero until the first snapshot lands.
    pub fn new() -> (Self, watch::Receiver<StatusCounts>) {
        let (tx, rx) = watch::channel(StatusCounts::default());
        (Self { tx }, rx)
    }

    /// Reduction loop. Runs until the subscription closes or the
    /// token is cancelled; spawned by the server's background tasks.
    pub async fn run(self, mut subscription: OrderSubscription, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                snapshot = subscription.recv() => match snapshot {
                    Some(orders) => {
                        let counts = StatusCounts::of(&orders);
                        tracing::debug!(total = counts.total(), "Status counts recomputed");
                        self.tx.send_replace(counts);
                    }
                    None => break,
                },
            }
        }
        tracing::debug!("Status aggregator stopped");
    }
}
