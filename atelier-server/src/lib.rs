//! Atelier Server - 工厂订单跟踪系统服务端
//!
//! # 架构概述
//!
//! 本模块是服务端的主入口，提供以下核心功能：
//!
//! - **订单核心** (`orders`): 序号分配、生命周期状态机、快照订阅
//! - **通知日志** (`notifications`): 追加式生命周期事件流
//! - **状态统计** (`stats`): 实时按状态计数的派生视图
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **身份边界** (`auth`): JWT 验证（签发在认证协作方）
//! - **HTTP API** (`api`): RESTful 命令 + WebSocket 快照流
//!
//! # 模块结构
//!
//! ```text
//! atelier-server/src/
//! ├── core/           # 配置、状态、服务器
//! ├── auth/           # JWT 验证、中间件
//! ├── api/            # HTTP 路由和处理器
//! ├── routes/         # 路由装配与中间件层
//! ├── utils/          # 错误、日志、校验、时间
//! ├── db/             # 数据库层（模型 + 仓库）
//! ├── orders/         # 订单生命周期核心
//! ├── notifications/  # 通知事件日志
//! └── stats/          # 状态聚合
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notifications;
pub mod orders;
pub mod routes;
pub mod stats;
pub mod utils;

// Re-export 公共类型
pub use auth::JwtService;
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use notifications::NotificationEmitter;
pub use orders::{OrderStore, StoreError};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 日志)
pub fn setup_environment() -> anyhow::Result<()> {
    // .env 不存在不是错误
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ___   __       ___
   /   | / /____  / (_)__  _____
  / /| |/ __/ _ \/ / / _ \/ ___/
 / ___ / /_/  __/ / /  __/ /
/_/  |_\__/\___/_/_/\___/_/
    "#
    );
}
