use std::sync::{Arc, Mutex};

use shared::stats::StatusCounts;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::notifications::NotificationEmitter;
use crate::orders::OrderStore;
use crate::stats::StatusAggregator;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是服务端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，克隆成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | order_store | OrderStore | 订单生命周期核心 |
/// | notifications | Arc<NotificationEmitter> | 通知事件日志 |
/// | status_counts | watch::Receiver | 实时状态计数 |
/// | jwt_service | Arc<JwtService> | JWT 验证服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    order_store: OrderStore,
    notifications: Arc<NotificationEmitter>,
    status_counts: watch::Receiver<StatusCounts>,
    jwt_service: Arc<JwtService>,
    /// 聚合器在 start_background_tasks 时被取出并启动
    aggregator: Arc<Mutex<Option<StatusAggregator>>>,
    shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/atelier.db)
    /// 3. 通知日志、订单核心、状态聚合器、JWT
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("atelier.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::with_db(config.clone(), db_service)
    }

    /// 基于已打开的数据库构造状态（测试使用内存引擎时走这里）
    pub fn with_db(config: Config, db_service: DbService) -> Self {
        let db = db_service.db;
        let notifications = Arc::new(NotificationEmitter::new(db.clone()));
        let order_store = OrderStore::new(db.clone(), notifications.clone());
        let (aggregator, status_counts) = StatusAggregator::new();
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));

        Self {
            config,
            db,
            order_store,
            notifications,
            status_counts,
            jwt_service,
            aggregator: Arc::new(Mutex::new(Some(aggregator))),
            shutdown: CancellationToken::new(),
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用（run 会自动调用）。
    ///
    /// 启动的任务：
    /// - 状态聚合器归约循环（消费无过滤订单流）
    pub fn start_background_tasks(&self) {
        let taken = self
            .aggregator
            .lock()
            .expect("aggregator mutex poisoned")
            .take();
        if let Some(aggregator) = taken {
            let subscription = self.order_store.subscribe(Default::default());
            let token = self.shutdown.child_token();
            tokio::spawn(aggregator.run(subscription, token));
            tracing::info!("Status aggregator started");
        }
    }

    /// 获取订单核心
    pub fn order_store(&self) -> &OrderStore {
        &self.order_store
    }

    /// 获取通知日志
    pub fn notifications(&self) -> &Arc<NotificationEmitter> {
        &self.notifications
    }

    /// 实时状态计数接收端（watch 总是持有最新值）
    pub fn status_counts(&self) -> watch::Receiver<StatusCounts> {
        self.status_counts.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 关闭令牌（后台任务监听此令牌退出）
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// 优雅关闭：取消后台任务和所有订阅流
    pub fn shutdown(&self) {
        tracing::info!("Shutting down server state");
        self.shutdown.cancel();
        self.order_store.shutdown_feed();
        self.notifications.shutdown();
    }
}
