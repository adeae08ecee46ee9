//! Order Server - 饮料店结账与叫号服务
//!
//! # 架构概述
//!
//! - **结账流水线** (`orders`): 标签标准化 → 按杯拆分 → 每日游标取号 → 批量落库
//! - **存储** (`orders::storage`): 嵌入式 redb
//! - **HTTP API** (`api`): 结账、订单查询、状态流转
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、错误
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 结账流水线与叫号
//! ├── utils/         # 日志、业务时区
//! └── weather.rs     # 天气快照
//! ```

pub mod api;
pub mod core;
pub mod orders;
pub mod utils;
pub mod weather;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use orders::{CheckoutError, OrderService, OrderStorage};

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境
///
/// 1. 加载 `.env`
/// 2. 创建工作目录
/// 3. 初始化日志 (生产环境 JSON + 文件)
pub fn setup_environment() -> anyhow::Result<Config> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;

    let log_dir = config.log_dir();
    let log_dir = log_dir.to_string_lossy();
    init_logger_with_file(
        &config.log_level,
        config.is_production(),
        Some(log_dir.as_ref()),
    )?;

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   ____          __
  / __ \_______/ /__ ____
 / /_/ / __/ _  / -_) __/
 \____/_/  \_,_/\__/_/
    "#
    );
}
