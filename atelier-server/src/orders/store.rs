//! Order Store - lifecycle commands and policy enforcement
//!
//! 所有订单写操作的唯一入口。每个操作要么完整提交要么按错误
//! 分类失败，绝不吞错；通知事件只在主写入确认提交后尽力追加。
//!
//! # 角色策略
//!
//! 原实现靠"渲染哪个看板"来决定谁能做什么；这里把策略收进
//! 存储边界：HTTP 层只负责提供 [`Viewer`] 身份。
//!
//! # 并发
//!
//! 同一订单上的并发流转是**最后写入者获胜**：读-校验-写之间
//! 没有版本令牌。这是对原系统语义的刻意保留，不是疏忽：
//! 引入 CAS 会改变可观察行为。序号分配是唯一需要原子
//! 读-改-写的共享资源，由 [`SequenceGenerator`] 负责。

use crate::db::models::{OrderEditPatch, OrderRow, OrderTransitionPatch};
use crate::db::repository::{OrderRepository, RepoError};
use crate::notifications::NotificationEmitter;
use crate::orders::feed::{ChangeScope, OrderChange, OrderFeed, OrderSubscription};
use crate::orders::sequence::{ORDERS_DOMAIN, SequenceGenerator, format_order_number};
use crate::utils::validation::{MAX_NOTE_LEN, check, validate_optional_text};
use crate::utils::{AppError, now_millis};
use shared::notification::NotificationInput;
use shared::order::{Order, OrderDraft, OrderFilter, OrderStatus, StatusChange, TransitionRequest};
use shared::role::{Role, Viewer};
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Store errors, one variant per failure class
#[derive(Debug, Error)]
pub enum StoreError {
    /// 输入缺失或格式错误，调用方修正后重发，不自动重试
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 流水线不允许的状态变化
    #[error("Illegal transition: {from} -> {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// 序号争用重试耗尽，整个 create 调用可安全重试
    #[error("Sequence allocation failed: {0}")]
    AllocationFailed(String),

    /// 引用的订单已不存在
    #[error("Order not found: {0}")]
    NotFound(String),

    /// 角色策略拒绝
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// 存储层故障
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl From<RepoError> for StoreError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => StoreError::NotFound(msg),
            RepoError::Database(msg) => StoreError::Persistence(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::InvalidTransition { from, to } => {
                AppError::InvalidTransition(format!("{from} -> {to}"))
            }
            StoreError::AllocationFailed(msg) => AppError::AllocationFailed(msg),
            StoreError::NotFound(msg) => AppError::NotFound(msg),
            StoreError::Forbidden(msg) => AppError::Forbidden(msg),
            StoreError::Persistence(msg) => AppError::Database(msg),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The order lifecycle engine
#[derive(Clone)]
pub struct OrderStore {
    repo: OrderRepository,
    sequence: SequenceGenerator,
    feed: OrderFeed,
    notifications: Arc<NotificationEmitter>,
}

impl OrderStore {
    pub fn new(db: Surreal<Db>, notifications: Arc<NotificationEmitter>) -> Self {
        let repo = OrderRepository::new(db.clone());
        Self {
            feed: OrderFeed::new(repo.clone()),
            repo,
            sequence: SequenceGenerator::new(db),
            notifications,
        }
    }

    // ========== Queries ==========

    /// Filtered list, newest update first
    pub async fn list(&self, filter: &OrderFilter) -> StoreResult<Vec<Order>> {
        let rows = self.repo.find_all(filter).await?;
        Ok(rows.into_iter().map(|r| r.into_order()).collect())
    }

    pub async fn get(&self, order_id: &str) -> StoreResult<Order> {
        let row = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Order {order_id} not found")))?;
        Ok(row.into_order())
    }

    /// Snapshot subscription, see [`OrderFeed::subscribe`]
    pub fn subscribe(&self, filter: OrderFilter) -> OrderSubscription {
        self.feed.subscribe(filter)
    }

    /// Stop all subscriptions (server shutdown)
    pub fn shutdown_feed(&self) {
        self.feed.shutdown();
    }

    // ========== Commands ==========

    /// Create a new order in `pending`.
    ///
    /// Allocates the order number via the sequence generator; the
    /// number is committed with the row, so a failed create never
    /// leaks a visible duplicate (an allocated-but-unused value is
    /// just a gap).
    pub async fn create(&self, draft: OrderDraft, actor: &Viewer) -> StoreResult<Order> {
        if actor.role != Role::Originator {
            return Err(StoreError::Forbidden(format!(
                "Role {} cannot create orders",
                actor.role
            )));
        }
        validate_draft(&draft)?;

        let sequence = self.sequence.next(ORDERS_DOMAIN).await?;
        let order_number = format_order_number(sequence);
        let now = now_millis();

        let row = OrderRow {
            id: None,
            order_number: order_number.clone(),
            client: draft.client,
            initial_product: draft.initial_product,
            initial_quantity: draft.initial_quantity,
            final_product: draft.final_product,
            final_quantity: draft.final_quantity,
            submitter: draft.submitter,
            machine_name: draft.machine_name,
            comment: draft.comment,
            status: OrderStatus::Pending,
            created_by: actor.uid.clone(),
            created_at: now,
            updated_at: now,
            rejection_reason: None,
            production_estimation: None,
            history: vec![StatusChange {
                status: OrderStatus::Pending,
                at: now,
                by: actor.uid.clone(),
            }],
        };

        let created = self.repo.create(row).await?;
        let order = created.into_order();

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            created_by = %actor.uid,
            "Order created"
        );

        self.feed
            .notify(OrderChange::created(order.id.clone(), scope_of(&order)));

        self.emit_notification(NotificationInput::created(
            order.id.clone(),
            format!(
                "Nouvelle commande {} créée par {}",
                order.order_number, actor.display_name
            ),
        ))
        .await;

        Ok(order)
    }

    /// Advance an order along the pipeline.
    ///
    /// Legality is checked against the stored status read immediately
    /// before the write; two racing operators resolve last-writer-wins.
    pub async fn transition(
        &self,
        order_id: &str,
        request: TransitionRequest,
        actor: &Viewer,
    ) -> StoreResult<Order> {
        let row = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Order {order_id} not found")))?;

        let from = row.status;
        let to = request.status;

        if !from.can_transition_to(to) {
            return Err(StoreError::InvalidTransition { from, to });
        }
        if !actor.role.may_transition(from, to) {
            return Err(StoreError::Forbidden(format!(
                "Role {} cannot move an order from {from} to {to}",
                actor.role
            )));
        }

        // Per-target payload requirements
        let rejection_reason = match to {
            OrderStatus::Rejected => {
                let reason = request
                    .rejection_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or_else(|| {
                        StoreError::Validation(
                            "rejection_reason is required when rejecting an order".to_string(),
                        )
                    })?;
                validate_optional_text(&Some(reason.to_string()), "rejection_reason", MAX_NOTE_LEN)
                    .map_err(StoreError::Validation)?;
                Some(reason.to_string())
            }
            _ => None,
        };

        let production_estimation = match to {
            OrderStatus::EnCours => {
                let estimation = request.production_estimation.ok_or_else(|| {
                    StoreError::Validation(
                        "production_estimation is required when starting production".to_string(),
                    )
                })?;
                if !estimation.is_valid() {
                    return Err(StoreError::Validation(
                        "production_estimation must have at least one positive field".to_string(),
                    ));
                }
                Some(estimation)
            }
            _ => None,
        };

        let now = now_millis();
        let mut history = row.history.clone();
        history.push(StatusChange {
            status: to,
            at: now,
            by: actor.uid.clone(),
        });

        let patch = OrderTransitionPatch {
            status: to,
            updated_at: now,
            rejection_reason,
            production_estimation,
            history,
        };

        let updated = self.repo.apply_transition(order_id, patch).await?;
        let order = updated.into_order();

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            from = %from,
            to = %to,
            by = %actor.uid,
            "Order transitioned"
        );

        self.feed.notify(OrderChange::updated(
            order.id.clone(),
            ChangeScope {
                status: from,
                created_by: order.created_by.clone(),
            },
            scope_of(&order),
        ));

        let input = if to == OrderStatus::Accepted {
            NotificationInput::accepted(
                order.id.clone(),
                format!("Commande acceptée par {}", actor.display_name),
            )
        } else {
            NotificationInput::status(
                order.id.clone(),
                to,
                format!("Statut de la commande modifié: {to}"),
            )
        };
        self.emit_notification(input).await;

        Ok(order)
    }

    /// Full field replacement by the originator.
    ///
    /// 无论当前状态如何，编辑都把订单送回审批队列 (pending)。
    pub async fn update(
        &self,
        order_id: &str,
        draft: OrderDraft,
        actor: &Viewer,
    ) -> StoreResult<Order> {
        let row = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Order {order_id} not found")))?;

        if actor.role != Role::Originator {
            return Err(StoreError::Forbidden(format!(
                "Role {} cannot edit orders",
                actor.role
            )));
        }
        if row.created_by != actor.uid {
            return Err(StoreError::Forbidden(
                "Only the creator can edit an order".to_string(),
            ));
        }
        validate_draft(&draft)?;

        let from = row.status;
        let now = now_millis();
        let mut history = row.history.clone();
        if from != OrderStatus::Pending {
            history.push(StatusChange {
                status: OrderStatus::Pending,
                at: now,
                by: actor.uid.clone(),
            });
        }

        let patch = OrderEditPatch {
            client: draft.client,
            initial_product: draft.initial_product,
            initial_quantity: draft.initial_quantity,
            final_product: draft.final_product,
            final_quantity: draft.final_quantity,
            submitter: draft.submitter,
            machine_name: draft.machine_name,
            comment: draft.comment,
            status: OrderStatus::Pending,
            updated_at: now,
            history,
        };

        let updated = self.repo.apply_edit(order_id, patch).await?;
        let order = updated.into_order();

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            by = %actor.uid,
            "Order edited, back to pending"
        );

        self.feed.notify(OrderChange::updated(
            order.id.clone(),
            ChangeScope {
                status: from,
                created_by: order.created_by.clone(),
            },
            scope_of(&order),
        ));

        Ok(order)
    }

    /// Hard delete: originator, own order, pending only.
    pub async fn remove(&self, order_id: &str, actor: &Viewer) -> StoreResult<()> {
        let row = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Order {order_id} not found")))?;

        if actor.role != Role::Originator {
            return Err(StoreError::Forbidden(format!(
                "Role {} cannot delete orders",
                actor.role
            )));
        }
        if row.created_by != actor.uid {
            return Err(StoreError::Forbidden(
                "Only the creator can delete an order".to_string(),
            ));
        }
        if row.status != OrderStatus::Pending {
            return Err(StoreError::Forbidden(format!(
                "Only pending orders can be deleted (current status: {})",
                row.status
            )));
        }

        self.repo.delete(order_id).await?;

        tracing::info!(order_id, by = %actor.uid, "Order deleted");

        self.feed.notify(OrderChange::removed(
            order_id,
            ChangeScope {
                status: row.status,
                created_by: row.created_by,
            },
        ));

        Ok(())
    }

    /// Best-effort notification append: a failure here never fails
    /// the primary operation.
    async fn emit_notification(&self, input: NotificationInput) {
        if let Err(e) = self.notifications.emit(input).await {
            tracing::warn!(error = %e, "Notification emission failed after committed write");
        }
    }
}

fn scope_of(order: &Order) -> ChangeScope {
    ChangeScope {
        status: order.status,
        created_by: order.created_by.clone(),
    }
}

fn validate_draft(draft: &OrderDraft) -> StoreResult<()> {
    check(draft).map_err(StoreError::Validation)?;
    validate_optional_text(&draft.comment, "comment", MAX_NOTE_LEN)
        .map_err(StoreError::Validation)?;
    Ok(())
}
