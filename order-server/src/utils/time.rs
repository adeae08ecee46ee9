//! 时间工具函数 — 业务时区
//!
//! Order dates, order times and day cursors all use the business timezone,
//! never the host clock's zone.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use shared::error::{AppError, AppResult};

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Taipei;

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 解析 IANA 时区名，失败回退到默认时区
pub fn parse_timezone(name: &str) -> Tz {
    name.trim().parse::<Tz>().unwrap_or_else(|e| {
        tracing::warn!(
            "Invalid timezone '{}': {}, falling back to {}",
            name,
            e,
            DEFAULT_TIMEZONE
        );
        DEFAULT_TIMEZONE
    })
}

/// 当前时间 (业务时区)
pub fn business_now(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// 当前营业日 (业务时区)
pub fn current_business_date(tz: Tz) -> NaiveDate {
    business_now(tz).date_naive()
}
