//! 通知事件日志
//!
//! 与订单订阅流相互独立的追加式生命周期事件日志。
//! 平台推送由外部协作方消费本模块的订阅流完成：核心只产出
//! 事件记录，不负责投递。

pub mod emitter;

pub use emitter::{NotificationEmitter, NotificationSubscription};
