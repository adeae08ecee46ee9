//! Persistence gateway
//!
//! The checkout pipeline only talks to storage through [`OrderGateway`].
//! Methods are blocking; async callers run them on the blocking pool.

use super::order_number::{SLOT_COUNT, TicketSlot};
use super::storage::{StorageError, StorageResult};
use chrono::{Datelike, NaiveDate};
use parking_lot::Mutex;
use shared::order::{NormalizedUnitOrder, OrderStats, OrderStatus};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Storage operations required by the order pipeline
pub trait OrderGateway: Send + Sync {
    /// Atomically read the day's cursor and advance it by one slot
    ///
    /// Returns the slot to use now. A date without a cursor starts at `A1`.
    fn advance_cursor(&self, date: NaiveDate) -> StorageResult<TicketSlot>;

    /// Read the day's cursor without advancing it
    fn peek_cursor(&self, date: NaiveDate) -> StorageResult<TicketSlot>;

    /// Overwrite the day's cursor with the next slot to hand out
    fn set_cursor(&self, date: NaiveDate, next: TicketSlot) -> StorageResult<()>;

    /// Whether an order dated in `year` already carries this order number
    ///
    /// `MMDD` numbers come back every year, so uniqueness is per calendar
    /// year of the order date.
    fn order_number_exists(&self, year: i32, order_number: &str) -> StorageResult<bool>;

    /// Persist a batch all-or-nothing
    ///
    /// Fails with [`StorageError::DuplicateOrderNumber`] if any number is
    /// already taken in its order's year, in which case nothing is written.
    fn insert_batch(&self, orders: &[NormalizedUnitOrder]) -> StorageResult<()>;

    /// Most recent order carrying this number
    fn get_order(&self, order_number: &str) -> StorageResult<Option<NormalizedUnitOrder>>;

    /// Move the most recent order carrying this number to a new status
    ///
    /// Returns the previous status together with the updated order.
    fn update_status(
        &self,
        order_number: &str,
        to: OrderStatus,
        now_millis: i64,
    ) -> StorageResult<(OrderStatus, NormalizedUnitOrder)>;

    /// Orders of one business date, oldest first
    fn list_orders(
        &self,
        date: NaiveDate,
        status: Option<OrderStatus>,
    ) -> StorageResult<Vec<NormalizedUnitOrder>>;

    fn stats(&self, date: NaiveDate) -> StorageResult<OrderStats> {
        let mut stats = OrderStats::empty(date);
        for order in self.list_orders(date, None)? {
            stats.record(order.status);
        }
        Ok(stats)
    }
}

/// Failure of a bounded gateway call
#[derive(Debug, Error)]
pub enum GatewayCallError {
    #[error("Storage call timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Storage task aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Run a blocking gateway call on the blocking pool, bounded by `timeout`
///
/// On timeout the call keeps running in the background; its result is
/// discarded.
pub async fn call_gateway<T, F>(
    gateway: &Arc<dyn OrderGateway>,
    timeout: Duration,
    f: F,
) -> Result<T, GatewayCallError>
where
    T: Send + 'static,
    F: FnOnce(&dyn OrderGateway) -> StorageResult<T> + Send + 'static,
{
    let gateway = gateway.clone();
    let task = tokio::task::spawn_blocking(move || f(gateway.as_ref()));
    match tokio::time::timeout(timeout, task).await {
        Err(_) => Err(GatewayCallError::Timeout(timeout)),
        Ok(Err(join_err)) => Err(GatewayCallError::Aborted(join_err.to_string())),
        Ok(Ok(result)) => Ok(result?),
    }
}

/// Check a status change against the lifecycle
pub(crate) fn check_transition(
    order: &NormalizedUnitOrder,
    to: OrderStatus,
) -> StorageResult<()> {
    if order.status.can_transition_to(to) {
        Ok(())
    } else {
        Err(StorageError::InvalidTransition {
            order_number: order.order_number.clone(),
            from: order.status,
            to,
        })
    }
}

pub(crate) fn sort_orders(orders: &mut [NormalizedUnitOrder]) {
    orders.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.order_number.cmp(&b.order_number))
    });
}

#[derive(Default)]
struct MemoryState {
    cursors: HashMap<NaiveDate, u16>,
    /// order_number -> year -> order
    orders: HashMap<String, BTreeMap<i32, NormalizedUnitOrder>>,
}

/// In-process gateway
///
/// Same semantics as the redb store, without durability.
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted orders
    pub fn len(&self) -> usize {
        self.state.lock().orders.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderGateway for MemoryGateway {
    fn advance_cursor(&self, date: NaiveDate) -> StorageResult<TicketSlot> {
        let mut state = self.state.lock();
        let cursor = state.cursors.entry(date).or_insert(0);
        let current = TicketSlot::from_index(*cursor);
        *cursor = (*cursor + 1) % SLOT_COUNT;
        Ok(current)
    }

    fn peek_cursor(&self, date: NaiveDate) -> StorageResult<TicketSlot> {
        let index = self.state.lock().cursors.get(&date).copied().unwrap_or(0);
        Ok(TicketSlot::from_index(index))
    }

    fn set_cursor(&self, date: NaiveDate, next: TicketSlot) -> StorageResult<()> {
        self.state.lock().cursors.insert(date, next.index());
        Ok(())
    }

    fn order_number_exists(&self, year: i32, order_number: &str) -> StorageResult<bool> {
        Ok(self
            .state
            .lock()
            .orders
            .get(order_number)
            .is_some_and(|years| years.contains_key(&year)))
    }

    fn insert_batch(&self, orders: &[NormalizedUnitOrder]) -> StorageResult<()> {
        let mut state = self.state.lock();
        let mut seen = HashSet::new();
        for order in orders {
            let year = order.order_date.year();
            let taken = state
                .orders
                .get(&order.order_number)
                .is_some_and(|years| years.contains_key(&year));
            if taken || !seen.insert((year, order.order_number.as_str())) {
                return Err(StorageError::DuplicateOrderNumber(
                    order.order_number.clone(),
                ));
            }
        }
        for order in orders {
            state
                .orders
                .entry(order.order_number.clone())
                .or_default()
                .insert(order.order_date.year(), order.clone());
        }
        Ok(())
    }

    fn get_order(&self, order_number: &str) -> StorageResult<Option<NormalizedUnitOrder>> {
        Ok(self
            .state
            .lock()
            .orders
            .get(order_number)
            .and_then(|years| years.values().next_back())
            .cloned())
    }

    fn update_status(
        &self,
        order_number: &str,
        to: OrderStatus,
        now_millis: i64,
    ) -> StorageResult<(OrderStatus, NormalizedUnitOrder)> {
        let mut state = self.state.lock();
        let order = state
            .orders
            .get_mut(order_number)
            .and_then(|years| years.values_mut().next_back())
            .ok_or_else(|| StorageError::OrderNotFound(order_number.to_string()))?;
        check_transition(order, to)?;
        let from = order.status;
        order.status = to;
        order.updated_at = now_millis;
        Ok((from, order.clone()))
    }

    fn list_orders(
        &self,
        date: NaiveDate,
        status: Option<OrderStatus>,
    ) -> StorageResult<Vec<NormalizedUnitOrder>> {
        let state = self.state.lock();
        let mut orders: Vec<NormalizedUnitOrder> = state
            .orders
            .values()
            .flat_map(BTreeMap::values)
            .filter(|o| o.order_date == date)
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        sort_orders(&mut orders);
        Ok(orders)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveTime};
    use shared::order::{
        IceLevel, NormalizedUnitOrder, OrderStatus, Size, SugarLevel, WeatherStatus,
    };

    pub fn unit_order(order_number: &str, date: NaiveDate, created_at: i64) -> NormalizedUnitOrder {
        NormalizedUnitOrder {
            id: created_at,
            checkout_id: "checkout".to_string(),
            drink_name: "紅茶".to_string(),
            size: Size::Small,
            ice: IceLevel::Iced,
            sugar: SugarLevel::Half,
            order_date: date,
            order_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default(),
            weather_status: WeatherStatus::Sunny,
            temperature: 25.0,
            status: OrderStatus::Pending,
            order_number: order_number.to_string(),
            created_at,
            updated_at: created_at,
        }
    }
}
