//! 订单模块 - 结账流水线与叫号
//!
//! # 组件
//!
//! | 模块 | 说明 |
//! |------|------|
//! | [`normalizer`] | 甜度 / 冰量 / 杯型 标签 → 标准代码 |
//! | [`expander`] | 按数量拆成单杯 |
//! | [`order_number`] | 订单号编解码 (`0918A1-2`) |
//! | [`allocator`] | 每日游标取号 + 冲突重试 |
//! | [`gateway`] | 存储契约 + 内存实现 |
//! | [`storage`] | redb 实现 |
//! | [`service`] | 结账与状态流转 |
//! | [`events`] | 订单通知广播 |

pub mod allocator;
pub mod error;
pub mod events;
pub mod expander;
pub mod gateway;
pub mod normalizer;
pub mod order_number;
pub mod service;
pub mod storage;

pub use allocator::{Allocation, MAX_ALLOCATION_ATTEMPTS, OrderNumberAllocator};
pub use error::{CHECKOUT_FAILED_MESSAGE, CheckoutError, CheckoutResult, ErrorClass};
pub use events::{OrderEventBus, OrderNotification};
pub use gateway::{MemoryGateway, OrderGateway};
pub use order_number::{BaseNumber, DatePrefix, OrderNumber, TicketSlot};
pub use service::OrderService;
pub use storage::{OrderStorage, StorageError};
