//! 工具模块 - 日志与业务时区

pub mod logger;
pub mod time;

pub use time::{business_now, current_business_date, parse_date, parse_timezone};
