use std::sync::Arc;

use crate::core::{Config, Result};
use crate::orders::{MemoryGateway, OrderEventBus, OrderGateway, OrderService, OrderStorage};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，clone 到每个 handler 的成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | orders | OrderService | 结账与订单状态 |
/// | events | OrderEventBus | 订单通知广播 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 订单服务
    pub orders: OrderService,
    /// 订单通知总线
    pub events: OrderEventBus,
}

impl ServerState {
    /// 使用指定存储构造状态
    pub fn new(config: Config, gateway: Arc<dyn OrderGateway>) -> Self {
        let events = OrderEventBus::new();
        let orders = OrderService::new(
            gateway,
            config.weather_provider(),
            events.clone(),
            config.date_prefix(),
            config.timezone,
            config.storage_timeout(),
        );
        Self {
            config,
            orders,
            events,
        }
    }

    /// 初始化服务器状态
    ///
    /// 创建工作目录并打开 `{work_dir}/orders.redb`
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let db_path = config.database_path();
        let storage = OrderStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Order database opened");
        Ok(Self::new(config.clone(), Arc::new(storage)))
    }

    /// 内存存储 (测试 / 演示)
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Arc::new(MemoryGateway::new()))
    }

    pub fn order_service(&self) -> &OrderService {
        &self.orders
    }
}
