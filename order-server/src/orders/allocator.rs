//! Order number allocator
//!
//! Draws the checkout-level base number from the day cursor, derives one
//! order number per cup and re-draws when any of them is already taken.
//!
//! Every cursor read also advances it, so two concurrent checkouts never
//! get the same base. Skipped slots are not reused. A number counts as
//! taken only when an order of the same year carries it.

use super::error::{CheckoutError, CheckoutResult};
use super::gateway::{OrderGateway, call_gateway};
use super::order_number::{BaseNumber, DatePrefix};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use std::time::Duration;

/// Cursor draws per checkout before giving up
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 5;

/// Numbers reserved for one checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub base: BaseNumber,
    /// `{base}-1` ..= `{base}-{count}`, in cup order
    pub order_numbers: Vec<String>,
}

impl Allocation {
    pub fn ticket(&self) -> String {
        self.base.ticket()
    }
}

#[derive(Clone)]
pub struct OrderNumberAllocator {
    gateway: Arc<dyn OrderGateway>,
    layout: DatePrefix,
    timeout: Duration,
}

impl OrderNumberAllocator {
    pub fn new(gateway: Arc<dyn OrderGateway>, layout: DatePrefix, timeout: Duration) -> Self {
        Self {
            gateway,
            layout,
            timeout,
        }
    }

    /// Allocate numbers for `count` cups on `date`
    ///
    /// - cursor read/advance failure or timeout: `OrderNumberAllocationFailed`, no retry
    /// - collision: draw again, up to [`MAX_ALLOCATION_ATTEMPTS`] draws
    /// - every draw collided: `OrderNumberAllocationExhausted`
    pub async fn allocate(&self, date: NaiveDate, count: usize) -> CheckoutResult<Allocation> {
        let mut last_base = String::new();

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let slot = call_gateway(&self.gateway, self.timeout, move |gw| {
                gw.advance_cursor(date)
            })
            .await
            .map_err(|e| {
                tracing::error!(date = %date, attempt, error = %e, "Failed to advance day cursor");
                CheckoutError::OrderNumberAllocationFailed(e.to_string())
            })?;

            let base = BaseNumber::new(date, self.layout, slot);
            let order_numbers = base.units(count);

            let candidates = order_numbers.clone();
            let year = date.year();
            let taken = call_gateway(&self.gateway, self.timeout, move |gw| {
                for number in candidates {
                    if gw.order_number_exists(year, &number)? {
                        return Ok(Some(number));
                    }
                }
                Ok(None)
            })
            .await
            .map_err(|e| {
                tracing::error!(base = %base, attempt, error = %e, "Order number existence check failed");
                CheckoutError::OrderNumberAllocationFailed(e.to_string())
            })?;

            match taken {
                None => {
                    tracing::debug!(base = %base, cups = count, attempt, "Order numbers allocated");
                    return Ok(Allocation {
                        base,
                        order_numbers,
                    });
                }
                Some(number) => {
                    tracing::warn!(
                        base = %base,
                        order_number = %number,
                        attempt,
                        "Order number already taken, drawing next slot"
                    );
                    last_base = base.to_string();
                }
            }
        }

        tracing::error!(
            target: "operator",
            date = %date,
            attempts = MAX_ALLOCATION_ATTEMPTS,
            last_base = %last_base,
            "Order number allocation exhausted, day cursor may be out of sync with stored orders"
        );
        Err(CheckoutError::OrderNumberAllocationExhausted {
            attempts: MAX_ALLOCATION_ATTEMPTS,
            last_base,
        })
    }
}
