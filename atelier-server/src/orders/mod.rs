//! 订单生命周期核心
//!
//! # 模块结构
//!
//! - [`sequence`]: 竞态安全的订单序号分配器
//! - [`store`]: 创建/流转/编辑/删除 + 存储边界上的角色策略
//! - [`feed`]: 变更广播与全量快照订阅
//!
//! # 命令流
//!
//! ```text
//! create / transition / update / remove
//!     ├─ 1. 读取当前行（流转前的合法性基准）
//!     ├─ 2. 合法性 + 角色策略 + 载荷校验
//!     ├─ 3. 持久化（单条语句提交）
//!     ├─ 4. feed.notify() 触发订阅流重新查询并推送全量快照
//!     └─ 5. 通知事件尽力追加（失败只记日志，不影响主操作）
//! ```

pub mod feed;
pub mod sequence;
pub mod store;

pub use feed::{OrderChange, OrderFeed, OrderSubscription};
pub use sequence::{ORDERS_DOMAIN, SequenceGenerator, format_order_number};
pub use store::{OrderStore, StoreError, StoreResult};
