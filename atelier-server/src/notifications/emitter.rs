//! Notification Emitter
//!
//! 追加、订阅、已读、删除。已读与删除都幂等：重复标记同一
//! 观看者、删除已删除的事件都是空操作而非错误。
//!
//! 订阅契约与订单流一致：每次变更后推送完整日志快照
//! （时间戳降序），展示截断由消费方自理。

use crate::db::models::NotificationRow;
use crate::db::repository::{NotificationRepository, RepoResult};
use crate::utils::now_millis;
use shared::notification::{Notification, NotificationInput};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

const CHANGE_CHANNEL_CAPACITY: usize = 256;
const SNAPSHOT_CHANNEL_CAPACITY: usize = 16;

/// Append-only notification log with snapshot subscriptions
#[derive(Clone)]
pub struct NotificationEmitter {
    repo: NotificationRepository,
    change_tx: broadcast::Sender<()>,
    shutdown: CancellationToken,
}

impl NotificationEmitter {
    pub fn new(db: Surreal<Db>) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            repo: NotificationRepository::new(db),
            change_tx,
            shutdown: CancellationToken::new(),
        }
    }

    /// Append an event to the log
    pub async fn emit(&self, input: NotificationInput) -> RepoResult<Notification> {
        let row = NotificationRow::from_input(input, now_millis());
        let created = self.repo.append(row).await?;
        let notification = created.into_notification();

        tracing::debug!(
            notification_id = %notification.id,
            kind = ?notification.kind,
            "Notification emitted"
        );

        self.signal_change();
        Ok(notification)
    }

    /// Most recent events, newest first (display convenience)
    pub async fn recent(&self, limit: usize) -> RepoResult<Vec<Notification>> {
        let rows = self.repo.find_recent(limit).await?;
        Ok(rows.into_iter().map(|r| r.into_notification()).collect())
    }

    /// Add `viewer_uid` to the event's read set.
    ///
    /// Set semantics: marking twice leaves the set unchanged; marking
    /// a deleted event is a no-op.
    pub async fn mark_read(&self, id: &str, viewer_uid: &str) -> RepoResult<()> {
        self.repo.mark_read(id, viewer_uid).await?;
        self.signal_change();
        Ok(())
    }

    /// Delete an event. Idempotent.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        self.repo.delete(id).await?;
        self.signal_change();
        Ok(())
    }

    /// Open a full-snapshot subscription over the whole log
    pub fn subscribe(&self) -> NotificationSubscription {
        let (snapshot_tx, snapshot_rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let mut changes = self.change_tx.subscribe();
        let token = self.shutdown.child_token();
        let task_token = token.clone();
        let repo = self.repo.clone();

        tokio::spawn(async move {
            if !deliver(&repo, &snapshot_tx).await {
                return;
            }

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    change = changes.recv() => match change {
                        Ok(()) => {
                            if !deliver(&repo, &snapshot_tx).await {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Notification feed lagged, re-querying");
                            if !deliver(&repo, &snapshot_tx).await {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        });

        NotificationSubscription {
            rx: snapshot_rx,
            token,
        }
    }

    /// Cancel every open subscription (server shutdown)
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn signal_change(&self) {
        let _ = self.change_tx.send(());
    }
}

async fn deliver(repo: &NotificationRepository, tx: &mpsc::Sender<Vec<Notification>>) -> bool {
    match repo.find_all().await {
        Ok(rows) => {
            let snapshot: Vec<Notification> =
                rows.into_iter().map(|r| r.into_notification()).collect();
            tx.send(snapshot).await.is_ok()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Notification snapshot query failed, skipping emission");
            true
        }
    }
}

/// Handle to one notification snapshot stream
pub struct NotificationSubscription {
    rx: mpsc::Receiver<Vec<Notification>>,
    token: CancellationToken,
}

impl NotificationSubscription {
    pub async fn recv(&mut self) -> Option<Vec<Notification>> {
        self.rx.recv().await
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for NotificationSubscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
