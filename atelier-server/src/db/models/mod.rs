//! Persisted row types
//!
//! 数据库行与线上类型分离：行持有 `Option<RecordId>`，
//! 通过 `into_*` 转换为面向客户端的 shared 类型（id 序列化为
//! "table:id" 字符串）。

pub mod counter;
pub mod notification;
pub mod order;
pub mod serde_helpers;

pub use counter::Counter;
pub use notification::NotificationRow;
pub use order::{OrderEditPatch, OrderRow, OrderTransitionPatch};
