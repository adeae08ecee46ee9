//! Checkout and admin response payloads

use super::line::OrderLine;
use super::types::OrderStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Checkout request body
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub order_details: Vec<OrderLine>,
}

/// Result of a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckoutReceipt {
    pub checkout_id: String,
    /// Shared base identifier, e.g. `0918A1`
    pub base_number: String,
    /// Letter+digit shown to staff and customers, e.g. `A1`
    pub ticket_number: String,
    /// One identifier per cup, in expansion order
    pub order_numbers: Vec<String>,
    pub cup_count: usize,
}

/// Admin status update body
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

/// Per-status counts for one business day (dashboard)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStats {
    pub date: NaiveDate,
    pub pending: u64,
    pub processing: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub total: u64,
}

impl OrderStats {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            pending: 0,
            processing: 0,
            completed: 0,
            cancelled: 0,
            total: 0,
        }
    }

    pub fn record(&mut self, status: OrderStatus) {
        match status {
            OrderStatus::Pending => self.pending += 1,
            OrderStatus::Processing => self.processing += 1,
            OrderStatus::Completed => self.completed += 1,
            OrderStatus::Cancelled => self.cancelled += 1,
        }
        self.total += 1;
    }
}
