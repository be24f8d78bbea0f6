use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::message::MessageBus;
use crate::orders::OrderEngine;
use crate::tables::TableCoordinator;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 各字段内部都是 `Arc` / 连接池句柄，clone 只是浅拷贝。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | SQLite 连接池 |
/// | message_bus | MessageBus | 实时事件广播 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | orders | OrderEngine | 订单引擎 |
/// | tables | TableCoordinator | 桌台协调 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub message_bus: MessageBus,
    pub jwt_service: Arc<JwtService>,
    pub orders: OrderEngine,
    pub tables: TableCoordinator,
}

impl ServerState {
    /// 在已打开的数据库之上组装各服务
    ///
    /// 测试直接传入内存数据库。
    pub fn from_db(config: Config, db: DbService) -> Self {
        let message_bus = MessageBus::with_capacity(config.event_channel_capacity);
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let orders = OrderEngine::new(db.pool.clone(), message_bus.clone());
        let tables = TableCoordinator::new(db.pool.clone(), message_bus.clone());

        Self {
            config,
            db,
            message_bus,
            jwt_service,
            orders,
            tables,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录
    /// 2. 数据库 (WAL + 迁移)
    /// 3. 各服务 (MessageBus, JWT, OrderEngine, TableCoordinator)
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = DbService::new(&config.database_path).await?;
        Ok(Self::from_db(config.clone(), db))
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    pub fn message_bus(&self) -> &MessageBus {
        &self.message_bus
    }
}
