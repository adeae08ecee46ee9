//! Persisted unit order (one physical cup)

use super::types::{IceLevel, OrderStatus, Size, SugarLevel, WeatherStatus};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// 单杯订单 - 一杯饮料对应一条记录
///
/// Created once by the checkout pipeline, afterwards only `status` and
/// `updated_at` change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedUnitOrder {
    /// Storage handle, see `util::record_id`
    pub id: i64,
    /// Groups all cups of one checkout
    pub checkout_id: String,
    pub drink_name: String,
    pub size: Size,
    pub ice: IceLevel,
    pub sugar: SugarLevel,
    /// Business-timezone calendar date of the checkout
    pub order_date: NaiveDate,
    pub order_time: NaiveTime,
    pub weather_status: WeatherStatus,
    pub temperature: f64,
    pub status: OrderStatus,
    /// Unique across all persisted orders, e.g. `0918A1-2`
    pub order_number: String,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis
    pub updated_at: i64,
}

impl NormalizedUnitOrder {
    /// Staff-facing ticket: letter+digit of the base identifier
    ///
    /// Falls back to the last two characters of the whole number when the
    /// identifier has no unit suffix.
    pub fn ticket_number(&self) -> &str {
        let base = self
            .order_number
            .split_once('-')
            .map(|(base, _)| base)
            .unwrap_or(&self.order_number);
        let cut = base
            .char_indices()
            .rev()
            .nth(1)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &base[cut..]
    }
}
