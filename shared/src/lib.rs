//! Shared domain types for the Atelier order-tracking system
//!
//! 这些类型在 atelier-server 和各角色看板客户端之间共享：
//!
//! - **订单** (`order`): 订单实体、状态机、创建/流转载荷
//! - **通知** (`notification`): 追加式生命周期事件记录
//! - **角色** (`role`): 三个看板角色与流转权限策略
//! - **统计** (`stats`): 按状态聚合的订单计数
//! - **推送** (`feed`): WebSocket 快照推送信封

pub mod feed;
pub mod notification;
pub mod order;
pub mod role;
pub mod stats;

// Re-export 公共类型
pub use feed::FeedMessage;
pub use notification::{Notification, NotificationInput, NotificationKind};
pub use order::{
    Order, OrderDraft, OrderFilter, OrderStatus, ProductionEstimation, StatusChange,
    TransitionRequest,
};
pub use role::{Role, Viewer};
pub use stats::StatusCounts;
