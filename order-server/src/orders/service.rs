//! Order service
//!
//! Checkout pipeline:
//!
//! ```text
//! OrderLine[] ─▶ expand (normalize + replicate) ─▶ allocate ─▶ insert_batch ─▶ publish
//! ```
//!
//! plus the staff-side operations (status transitions, daily listing,
//! dashboard counts).

use super::allocator::OrderNumberAllocator;
use super::error::{CheckoutError, CheckoutResult};
use super::events::{OrderEventBus, OrderNotification};
use super::expander::expand;
use super::gateway::{OrderGateway, call_gateway};
use super::order_number::{DatePrefix, TicketSlot};
use crate::utils::time::business_now;
use crate::weather::WeatherProvider;
use chrono::{DateTime, NaiveDate, Timelike};
use chrono_tz::Tz;
use shared::order::{CheckoutReceipt, NormalizedUnitOrder, OrderLine, OrderStats, OrderStatus};
use shared::util::{now_millis, record_id};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct OrderService {
    gateway: Arc<dyn OrderGateway>,
    allocator: OrderNumberAllocator,
    weather: Arc<dyn WeatherProvider>,
    events: OrderEventBus,
    tz: Tz,
    timeout: Duration,
}

impl OrderService {
    pub fn new(
        gateway: Arc<dyn OrderGateway>,
        weather: Arc<dyn WeatherProvider>,
        events: OrderEventBus,
        layout: DatePrefix,
        tz: Tz,
        timeout: Duration,
    ) -> Self {
        Self {
            allocator: OrderNumberAllocator::new(gateway.clone(), layout, timeout),
            gateway,
            weather,
            events,
            tz,
            timeout,
        }
    }

    pub fn events(&self) -> &OrderEventBus {
        &self.events
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// 当前营业日
    pub fn today(&self) -> NaiveDate {
        business_now(self.tz).date_naive()
    }

    /// Process one checkout at the current business time
    pub async fn checkout(&self, lines: &[OrderLine]) -> CheckoutResult<CheckoutReceipt> {
        self.checkout_at(lines, business_now(self.tz)).await
    }

    /// Process one checkout at a given business time
    ///
    /// All-or-nothing: on error no unit order of this checkout is stored.
    /// Numbers drawn before a failure are abandoned, never reused.
    pub async fn checkout_at(
        &self,
        lines: &[OrderLine],
        now: DateTime<Tz>,
    ) -> CheckoutResult<CheckoutReceipt> {
        let checkout_id = uuid::Uuid::new_v4().to_string();

        let expansion = expand(lines).inspect_err(|e| {
            tracing::info!(checkout_id = %checkout_id, error = %e, "Checkout rejected");
        })?;

        for (line, fallback) in &expansion.fallbacks {
            tracing::warn!(
                checkout_id = %checkout_id,
                line,
                attribute = %fallback.attribute,
                raw = ?fallback.raw,
                substituted = fallback.substituted,
                "Unrecognized attribute, default substituted"
            );
        }

        let order_date = now.date_naive();
        let order_time = now.time().with_nanosecond(0).unwrap_or_else(|| now.time());
        let cup_count = expansion.units.len();

        let allocation = self.allocator.allocate(order_date, cup_count).await?;

        let weather = self.weather.current();
        let created_at = now.timestamp_millis();
        let orders: Vec<NormalizedUnitOrder> = expansion
            .units
            .into_iter()
            .zip(&allocation.order_numbers)
            .map(|(unit, order_number)| NormalizedUnitOrder {
                id: record_id(),
                checkout_id: checkout_id.clone(),
                drink_name: unit.drink_name,
                size: unit.size,
                ice: unit.ice,
                sugar: unit.sugar,
                order_date,
                order_time,
                weather_status: weather.status,
                temperature: weather.temperature,
                status: OrderStatus::Pending,
                order_number: order_number.clone(),
                created_at,
                updated_at: created_at,
            })
            .collect();

        call_gateway(&self.gateway, self.timeout, move |gw| gw.insert_batch(&orders))
            .await
            .map_err(|e| {
                tracing::error!(
                    checkout_id = %checkout_id,
                    base = %allocation.base,
                    error = %e,
                    "Failed to persist order batch"
                );
                CheckoutError::PersistenceBatchFailed(e.to_string())
            })?;

        let ticket_number = allocation.ticket();
        tracing::info!(
            checkout_id = %checkout_id,
            ticket = %ticket_number,
            cups = cup_count,
            "Checkout persisted"
        );

        self.events.publish(OrderNotification::Created {
            checkout_id: checkout_id.clone(),
            ticket_number: ticket_number.clone(),
            order_numbers: allocation.order_numbers.clone(),
        });

        Ok(CheckoutReceipt {
            checkout_id,
            base_number: allocation.base.to_string(),
            ticket_number,
            order_numbers: allocation.order_numbers,
            cup_count,
        })
    }

    /// Move one cup to a new status (forward only)
    pub async fn update_status(
        &self,
        order_number: &str,
        to: OrderStatus,
    ) -> CheckoutResult<NormalizedUnitOrder> {
        let number = order_number.to_string();
        let (from, order) = call_gateway(&self.gateway, self.timeout, move |gw| {
            gw.update_status(&number, to, now_millis())
        })
        .await?;

        tracing::info!(order_number = %order_number, from = %from, to = %to, "Order status changed");
        self.events.publish(OrderNotification::StatusChanged {
            order_number: order.order_number.clone(),
            from,
            to,
        });
        Ok(order)
    }

    pub async fn get_order(&self, order_number: &str) -> CheckoutResult<NormalizedUnitOrder> {
        let number = order_number.to_string();
        call_gateway(&self.gateway, self.timeout, move |gw| gw.get_order(&number))
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_number.to_string()))
    }

    pub async fn list_orders(
        &self,
        date: NaiveDate,
        status: Option<OrderStatus>,
    ) -> CheckoutResult<Vec<NormalizedUnitOrder>> {
        let orders =
            call_gateway(&self.gateway, self.timeout, move |gw| gw.list_orders(date, status))
                .await?;
        Ok(orders)
    }

    pub async fn stats(&self, date: NaiveDate) -> CheckoutResult<OrderStats> {
        Ok(call_gateway(&self.gateway, self.timeout, move |gw| gw.stats(date)).await?)
    }

    /// Next ticket slot the day's cursor will hand out
    pub async fn cursor(&self, date: NaiveDate) -> CheckoutResult<TicketSlot> {
        Ok(call_gateway(&self.gateway, self.timeout, move |gw| gw.peek_cursor(date)).await?)
    }

    /// Reposition the day's cursor (repair after a desync alert)
    pub async fn reset_cursor(&self, date: NaiveDate, next: TicketSlot) -> CheckoutResult<()> {
        let previous = call_gateway(&self.gateway, self.timeout, move |gw| {
            let previous = gw.peek_cursor(date)?;
            gw.set_cursor(date, next)?;
            Ok(previous)
        })
        .await?;

        tracing::warn!(
            target: "operator",
            date = %date,
            from = %previous,
            to = %next,
            "Day cursor reset"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::gateway::MemoryGateway;
    use super::super::gateway::test_support::unit_order;
    use super::super::storage::StorageResult;
    use super::*;
    use crate::utils::time::DEFAULT_TIMEZONE;
    use crate::weather::FallbackWeather;
    use chrono::TimeZone;
    use shared::order::{IceLevel, Size, SugarLevel, WeatherStatus};

    fn service_with(gateway: Arc<dyn OrderGateway>) -> OrderService {
        OrderService::new(
            gateway,
            Arc::new(FallbackWeather),
            OrderEventBus::new(),
            DatePrefix::MonthDay,
            DEFAULT_TIMEZONE,
            Duration::from_secs(2),
        )
    }

    fn noon() -> DateTime<Tz> {
        DEFAULT_TIMEZONE
            .with_ymd_and_hms(2025, 9, 18, 14, 30, 0)
            .unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 18).unwrap()
    }

    fn pearl_milk_tea() -> OrderLine {
        OrderLine::new("珍珠奶茶")
            .with_size("大杯")
            .with_ice("少冰")
            .with_sugar("半糖")
            .with_quantity(2)
    }

    /// Delegates to memory but every batch insert fails
    struct FailingInsert(MemoryGateway);

    impl OrderGateway for FailingInsert {
        fn advance_cursor(&self, date: NaiveDate) -> StorageResult<TicketSlot> {
            self.0.advance_cursor(date)
        }
        fn peek_cursor(&self, date: NaiveDate) -> StorageResult<TicketSlot> {
            self.0.peek_cursor(date)
        }
        fn set_cursor(&self, date: NaiveDate, next: TicketSlot) -> StorageResult<()> {
            self.0.set_cursor(date, next)
        }
        fn order_number_exists(&self, year: i32, order_number: &str) -> StorageResult<bool> {
            self.0.order_number_exists(year, order_number)
        }
        fn insert_batch(&self, _orders: &[NormalizedUnitOrder]) -> StorageResult<()> {
            Err(serde_json::from_str::<u8>("{").unwrap_err().into())
        }
        fn get_order(&self, order_number: &str) -> StorageResult<Option<NormalizedUnitOrder>> {
            self.0.get_order(order_number)
        }
        fn update_status(
            &self,
            order_number: &str,
            to: OrderStatus,
            now_millis: i64,
        ) -> StorageResult<(OrderStatus, NormalizedUnitOrder)> {
            self.0.update_status(order_number, to, now_millis)
        }
        fn list_orders(
            &self,
            date: NaiveDate,
            status: Option<OrderStatus>,
        ) -> StorageResult<Vec<NormalizedUnitOrder>> {
            self.0.list_orders(date, status)
        }
    }

    #[tokio::test]
    async fn test_two_cup_checkout_on_fresh_day() {
        let gateway = Arc::new(MemoryGateway::new());
        let service = service_with(gateway.clone());

        let receipt = service
            .checkout_at(&[pearl_milk_tea()], noon())
            .await
            .unwrap();

        assert_eq!(receipt.base_number, "0918A1");
        assert_eq!(receipt.ticket_number, "A1");
        assert_eq!(receipt.order_numbers, ["0918A1-1", "0918A1-2"]);
        assert_eq!(receipt.cup_count, 2);

        let orders = service.list_orders(day(), None).await.unwrap();
        assert_eq!(orders.len(), 2);
        for order in &orders {
            assert_eq!(order.drink_name, "珍珠奶茶");
            assert_eq!(order.size, Size::Large);
            assert_eq!(order.ice, IceLevel::Less);
            assert_eq!(order.sugar, SugarLevel::Half);
            assert_eq!(order.status, OrderStatus::Pending);
            assert_eq!(order.weather_status, WeatherStatus::Sunny);
            assert_eq!(order.temperature, 25.0);
            assert_eq!(order.order_date, day());
            assert_eq!(order.checkout_id, receipt.checkout_id);
            assert_eq!(order.ticket_number(), "A1");
        }
        assert_ne!(orders[0].id, orders[1].id);
    }

    #[tokio::test]
    async fn test_sequential_checkouts_roll_letter_after_nine() {
        let service = service_with(Arc::new(MemoryGateway::new()));

        let mut tickets = Vec::new();
        for _ in 0..10 {
            let receipt = service
                .checkout_at(&[OrderLine::new("紅茶")], noon())
                .await
                .unwrap();
            tickets.push(receipt.ticket_number);
        }
        assert_eq!(
            tickets,
            ["A1", "A2", "A3", "A4", "A5", "A6", "A7", "A8", "A9", "B1"]
        );
    }

    #[tokio::test]
    async fn test_same_date_next_year_starts_at_a1() {
        let gateway = Arc::new(MemoryGateway::new());
        let last_year = NaiveDate::from_ymd_opt(2024, 9, 18).unwrap();
        let old: Vec<_> = (1..=5)
            .map(|digit| unit_order(&format!("0918A{}-1", digit), last_year, digit))
            .collect();
        gateway.insert_batch(&old).unwrap();
        let service = service_with(gateway.clone());

        let receipt = service
            .checkout_at(&[OrderLine::new("紅茶")], noon())
            .await
            .unwrap();
        assert_eq!(receipt.order_numbers, ["0918A1-1"]);

        let order = service.get_order("0918A1-1").await.unwrap();
        assert_eq!(order.order_date, day());
        assert_eq!(gateway.list_orders(last_year, None).unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_reset_cursor_moves_next_ticket() {
        let service = service_with(Arc::new(MemoryGateway::new()));
        assert_eq!(service.cursor(day()).await.unwrap(), TicketSlot::FIRST);

        service
            .reset_cursor(day(), TicketSlot::new('D', 4).unwrap())
            .await
            .unwrap();
        assert_eq!(service.cursor(day()).await.unwrap().to_string(), "D4");

        let receipt = service
            .checkout_at(&[OrderLine::new("紅茶")], noon())
            .await
            .unwrap();
        assert_eq!(receipt.ticket_number, "D4");
    }

    #[tokio::test]
    async fn test_invalid_quantity_allocates_nothing() {
        let gateway = Arc::new(MemoryGateway::new());
        let service = service_with(gateway.clone());

        let err = service
            .checkout_at(&[OrderLine::new("紅茶").with_quantity("abc")], noon())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidQuantity { .. }));
        assert!(gateway.is_empty());

        // 游标未动
        let receipt = service
            .checkout_at(&[OrderLine::new("紅茶")], noon())
            .await
            .unwrap();
        assert_eq!(receipt.ticket_number, "A1");
    }

    #[tokio::test]
    async fn test_unknown_sugar_still_succeeds() {
        let service = service_with(Arc::new(MemoryGateway::new()));

        let receipt = service
            .checkout_at(&[OrderLine::new("綠茶").with_sugar("少糖")], noon())
            .await
            .unwrap();

        let order = service.get_order(&receipt.order_numbers[0]).await.unwrap();
        assert_eq!(order.sugar, SugarLevel::Half);
    }

    #[tokio::test]
    async fn test_persistence_failure_abandons_numbers() {
        let gateway = Arc::new(FailingInsert(MemoryGateway::new()));
        let service = service_with(gateway.clone());

        let err = service
            .checkout_at(&[pearl_milk_tea()], noon())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::PersistenceBatchFailed(_)));
        assert!(service.list_orders(day(), None).await.unwrap().is_empty());

        // A1 已作废，游标不回退
        assert_eq!(gateway.advance_cursor(day()).unwrap().to_string(), "A2");
    }

    #[tokio::test]
    async fn test_checkout_publishes_notification() {
        let service = service_with(Arc::new(MemoryGateway::new()));
        let mut rx = service.events().subscribe();

        let receipt = service
            .checkout_at(&[pearl_milk_tea()], noon())
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            OrderNotification::Created {
                checkout_id,
                ticket_number,
                order_numbers,
            } => {
                assert_eq!(checkout_id, receipt.checkout_id);
                assert_eq!(ticket_number, "A1");
                assert_eq!(order_numbers, receipt.order_numbers);
            }
            other => panic!("unexpected notification: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let service = service_with(Arc::new(MemoryGateway::new()));
        let receipt = service
            .checkout_at(&[pearl_milk_tea()], noon())
            .await
            .unwrap();
        let first = &receipt.order_numbers[0];
        let mut rx = service.events().subscribe();

        let order = service
            .update_status(first, OrderStatus::Processing)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(matches!(
            rx.recv().await.unwrap(),
            OrderNotification::StatusChanged {
                from: OrderStatus::Pending,
                to: OrderStatus::Processing,
                ..
            }
        ));

        service
            .update_status(first, OrderStatus::Completed)
            .await
            .unwrap();

        let err = service
            .update_status(first, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidStatusTransition { .. }));

        let err = service
            .update_status("0918Z9-1", OrderStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound(_)));

        let stats = service.stats(day()).await.unwrap();
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total, 2);
    }

    #[tokio::test]
    async fn test_missing_order_lookup() {
        let service = service_with(Arc::new(MemoryGateway::new()));
        let err = service.get_order("0918A1-1").await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound(_)));
    }
}
